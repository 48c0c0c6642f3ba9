use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use crate::{
    app::state::AppState,
    error::AppError,
    services::scheduler::{ScanScheduler, ScanSchedulerConfig},
    telemetry,
};

pub async fn run() -> Result<(), AppError> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|err| AppError::Internal(format!("DATABASE_URL missing: {}", err)))?;
    let max_connections = read_env_u32("DATABASE_MAX_CONNECTIONS").unwrap_or(20);
    let min_connections = read_env_u32("DATABASE_MIN_CONNECTIONS").unwrap_or(5);
    let acquire_timeout_secs = read_env_u64("DATABASE_ACQUIRE_TIMEOUT_SECS").unwrap_or(15);
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(min_connections)
        .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
        .connect(&database_url)
        .await
        .map_err(AppError::Database)?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|err| AppError::Internal(format!("migration failed: {}", err)))?;

    let state = AppState::new(pool);
    let scheduler = ScanScheduler::spawn(
        state.db.clone(),
        state.email_service.clone(),
        ScanSchedulerConfig::from_env(),
    );

    tracing::info!("Taskboard core running; Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .map_err(|err| AppError::Internal(format!("signal wait failed: {}", err)))?;

    scheduler.shutdown().await;
    Ok(())
}

fn read_env_u32(key: &str) -> Option<u32> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
}

fn read_env_u64(key: &str) -> Option<u64> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
}
