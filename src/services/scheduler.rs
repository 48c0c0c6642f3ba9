use std::{env, time::Duration};

use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::{services::email::EmailService, usecases::due_scan};

/// Default pass interval. The offset set is designed around a daily
/// pass, but the cadence stays deployment configuration.
const DEFAULT_SCAN_INTERVAL_SECS: u64 = 86_400;

#[derive(Clone, Debug)]
pub struct ScanSchedulerConfig {
    pub interval: Duration,
    pub enabled: bool,
    /// Base URL embedded as the board deep link in notification texts.
    pub board_link_base: String,
}

impl ScanSchedulerConfig {
    pub fn from_env() -> Self {
        Self {
            interval: interval_from(env::var("DUE_SCAN_INTERVAL_SECS").ok().as_deref()),
            enabled: enabled_from(env::var("DUE_SCAN_ENABLED").ok().as_deref()),
            board_link_base: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }
}

enum SchedulerCommand {
    /// Request an immediate pass.
    ScanNow,
    /// Stop the scheduler. An in-flight pass runs to completion first.
    Shutdown,
}

/// Handle for controlling the spawned scheduler.
pub struct ScanSchedulerHandle {
    tx: Option<mpsc::Sender<SchedulerCommand>>,
}

impl ScanSchedulerHandle {
    pub async fn scan_now(&self) {
        if let Some(ref tx) = self.tx {
            let _ = tx.send(SchedulerCommand::ScanNow).await;
        }
    }

    pub async fn shutdown(&self) {
        if let Some(ref tx) = self.tx {
            let _ = tx.send(SchedulerCommand::Shutdown).await;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }
}

/// Singleton periodic due-date scan, owned by the application lifecycle
/// rather than any request path.
pub struct ScanScheduler;

impl ScanScheduler {
    pub fn spawn(
        pool: PgPool,
        email_service: Option<EmailService>,
        config: ScanSchedulerConfig,
    ) -> ScanSchedulerHandle {
        if !config.enabled {
            tracing::info!("Due-date scan disabled (DUE_SCAN_ENABLED=false)");
            return ScanSchedulerHandle { tx: None };
        }
        if config.interval.is_zero() {
            tracing::info!("Due-date scan disabled (DUE_SCAN_INTERVAL_SECS=0)");
            return ScanSchedulerHandle { tx: None };
        }

        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(Self::run(pool, email_service, config, rx));

        ScanSchedulerHandle { tx: Some(tx) }
    }

    async fn run(
        pool: PgPool,
        email_service: Option<EmailService>,
        config: ScanSchedulerConfig,
        mut rx: mpsc::Receiver<SchedulerCommand>,
    ) {
        let mut interval = tokio::time::interval(config.interval);
        // The first tick completes immediately; wait a full period instead.
        interval.tick().await;

        tracing::info!(
            interval_secs = config.interval.as_secs(),
            "Due-date scan scheduler started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    Self::scan(&pool, email_service.as_ref(), &config).await;
                }
                command = rx.recv() => match command {
                    Some(SchedulerCommand::ScanNow) => {
                        Self::scan(&pool, email_service.as_ref(), &config).await;
                    }
                    Some(SchedulerCommand::Shutdown) | None => {
                        tracing::info!("Due-date scan scheduler stopped");
                        break;
                    }
                },
            }
        }
    }

    async fn scan(pool: &PgPool, email_service: Option<&EmailService>, config: &ScanSchedulerConfig) {
        let report = due_scan::run_scan(pool, email_service, &config.board_link_base).await;
        tracing::info!(
            date = %report.date,
            created = report.notifications_created(),
            failures = report.failures.len(),
            "Due-date scan finished"
        );
    }
}

fn interval_from(value: Option<&str>) -> Duration {
    let secs = value
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_SCAN_INTERVAL_SECS);

    Duration::from_secs(secs)
}

fn enabled_from(value: Option<&str>) -> bool {
    value.map(|v| v != "false" && v != "0").unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_defaults_to_daily() {
        assert_eq!(interval_from(None), Duration::from_secs(86_400));
    }

    #[test]
    fn interval_reads_configured_seconds() {
        assert_eq!(interval_from(Some("3600")), Duration::from_secs(3600));
    }

    #[test]
    fn interval_falls_back_on_garbage() {
        assert_eq!(interval_from(Some("soon")), Duration::from_secs(86_400));
    }

    #[test]
    fn enabled_unless_explicitly_off() {
        assert!(enabled_from(None));
        assert!(enabled_from(Some("true")));
        assert!(!enabled_from(Some("false")));
        assert!(!enabled_from(Some("0")));
    }
}
