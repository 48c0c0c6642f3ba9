use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::AppError, models::users::User};

/// Notification recipient resolved from a membership or responsibility
/// row: enough to persist the record and address the email.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct RecipientRow {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

pub async fn find_user_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, AppError> {
    let user = crate::log_query_fetch_optional!(
        "users.find_user_by_id",
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, phone, avatar_url, created_at
            FROM core.user
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
    )?;

    Ok(user)
}

pub(crate) async fn find_recipient(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<RecipientRow>, AppError> {
    let recipient = crate::log_query_fetch_optional!(
        "users.find_recipient",
        sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT id AS user_id, username, email
            FROM core.user
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
    )?;

    Ok(recipient)
}
