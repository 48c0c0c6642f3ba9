use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateNotificationRequest {
    pub user_id: Uuid,
    pub title: String,
    pub text: String,
}

/// Partial update: only supplied fields mutate.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateNotificationRequest {
    pub is_read: Option<bool>,
    pub title: Option<String>,
    pub text: Option<String>,
}

impl UpdateNotificationRequest {
    pub fn is_empty(&self) -> bool {
        self.is_read.is_none() && self.title.is_none() && self.text.is_none()
    }
}
