use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// In-app notification record mapped to core.notification. The persisted
/// row is the source of truth for "was the user notified"; email delivery
/// is best-effort on top of it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub text: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
