use sqlx::PgPool;

use crate::services::email::EmailService;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub email_service: Option<EmailService>,
}

impl AppState {
    pub fn new(db: PgPool) -> Self {
        let email_service = match EmailService::from_env() {
            Ok(service) => Some(service),
            Err(message) => {
                warn!("Email service not configured: {}", message);
                None
            }
        };

        Self { db, email_service }
    }
}
