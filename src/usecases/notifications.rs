use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dto::notifications::{CreateNotificationRequest, UpdateNotificationRequest},
    error::AppError,
    models::notifications::Notification,
    repositories::notifications as notification_repo,
    repositories::users as user_repo,
    services::email::EmailService,
};

pub struct NotificationService;

impl NotificationService {
    /// Persists the notification record, then attempts email delivery on
    /// top of it. The record is the source of truth: a failed or timed
    /// out send is logged and never rolls it back.
    pub async fn emit(
        pool: &PgPool,
        email_service: Option<&EmailService>,
        recipient_id: Uuid,
        title: &str,
        text: &str,
    ) -> Result<Notification, AppError> {
        let notification =
            notification_repo::create_notification(pool, recipient_id, title, text).await?;

        if let Some(email) = email_service {
            match user_repo::find_recipient(pool, recipient_id).await {
                Ok(Some(recipient)) => {
                    if let Err(error) = email.send_notification(&recipient.email, title, text).await
                    {
                        tracing::warn!(
                            user_id = %recipient_id,
                            error = %error,
                            "Notification email not delivered"
                        );
                    }
                }
                Ok(None) => {
                    tracing::warn!(user_id = %recipient_id, "Notification recipient has no user record");
                }
                Err(error) => {
                    tracing::warn!(
                        user_id = %recipient_id,
                        error = %error,
                        "Notification recipient lookup failed"
                    );
                }
            }
        }

        Ok(notification)
    }

    /// Record-only creation; no email side effect.
    pub async fn create(
        pool: &PgPool,
        req: CreateNotificationRequest,
    ) -> Result<Notification, AppError> {
        user_repo::find_user_by_id(pool, req.user_id)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))?;

        notification_repo::create_notification(pool, req.user_id, &req.title, &req.text).await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Notification>, AppError> {
        notification_repo::list_all(pool).await
    }

    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<Notification>, AppError> {
        notification_repo::list_for_user(pool, user_id).await
    }

    pub async fn update_notification(
        pool: &PgPool,
        notification_id: i64,
        req: UpdateNotificationRequest,
    ) -> Result<(), AppError> {
        if req.is_empty() {
            return Err(AppError::InvalidInput(
                "Notification update requires at least one field".to_string(),
            ));
        }

        let updated =
            notification_repo::update_notification_fields(pool, notification_id, &req).await?;
        if updated == 0 {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }

        Ok(())
    }

    pub async fn mark_read(pool: &PgPool, notification_id: i64) -> Result<(), AppError> {
        let updated = notification_repo::mark_read(pool, notification_id).await?;
        if updated == 0 {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }

        Ok(())
    }

    pub async fn delete(pool: &PgPool, notification_id: i64) -> Result<(), AppError> {
        let deleted = notification_repo::delete_notification(pool, notification_id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::dto::notifications::UpdateNotificationRequest;

    #[test]
    fn empty_update_payload_is_detected() {
        assert!(UpdateNotificationRequest::default().is_empty());
        assert!(
            !UpdateNotificationRequest {
                is_read: Some(true),
                ..Default::default()
            }
            .is_empty()
        );
    }
}
