use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dto::notifications::UpdateNotificationRequest, error::AppError,
    models::notifications::Notification,
};

pub async fn create_notification(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    text: &str,
) -> Result<Notification, AppError> {
    let notification = crate::log_query_fetch_one!(
        "notifications.create_notification",
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO core.notification (user_id, title, text)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(text)
        .fetch_one(pool)
    )?;

    Ok(notification)
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<Notification>, AppError> {
    let notifications = crate::log_query_fetch_all!(
        "notifications.list_all",
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT *
            FROM core.notification
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
    )?;

    Ok(notifications)
}

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
    let notifications = crate::log_query_fetch_all!(
        "notifications.list_for_user",
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT *
            FROM core.notification
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
    )?;

    Ok(notifications)
}

pub async fn update_notification_fields(
    pool: &PgPool,
    notification_id: i64,
    req: &UpdateNotificationRequest,
) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "notifications.update_notification_fields",
        sqlx::query(
            r#"
            UPDATE core.notification
            SET is_read = COALESCE($2, is_read),
                title = COALESCE($3, title),
                text = COALESCE($4, text)
            WHERE id = $1
            "#,
        )
        .bind(notification_id)
        .bind(req.is_read)
        .bind(req.title.as_deref())
        .bind(req.text.as_deref())
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}

pub async fn mark_read(pool: &PgPool, notification_id: i64) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "notifications.mark_read",
        sqlx::query(
            r#"
            UPDATE core.notification
            SET is_read = TRUE
            WHERE id = $1
            "#,
        )
        .bind(notification_id)
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}

pub async fn delete_notification(pool: &PgPool, notification_id: i64) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "notifications.delete_notification",
        sqlx::query(
            r#"
            DELETE FROM core.notification
            WHERE id = $1
            "#,
        )
        .bind(notification_id)
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}
