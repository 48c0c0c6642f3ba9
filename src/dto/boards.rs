use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{dto::tasks::TaskView, models::boards::BoardRole};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateBoardRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default = "default_is_public")]
    pub is_public: bool,
    pub color: Option<String>,
}

fn default_is_public() -> bool {
    true
}

/// Partial update: only supplied fields mutate.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateBoardRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub color: Option<String>,
}

impl UpdateBoardRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.is_public.is_none()
            && self.color.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lightweight user payload embedded in member lists, responsibles and
/// comment authors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreview {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BoardMemberResponse {
    pub user: UserPreview,
    pub role: BoardRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateColumnRequest {
    pub title: String,
    pub position: i32,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateColumnRequest {
    pub title: Option<String>,
    pub color: Option<String>,
}

impl UpdateColumnRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.color.is_none()
    }
}

/// One entry of a batch column reorder. Callers supply the full absolute
/// ordering; positions are written as given, without renumbering.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColumnPositionUpdate {
    pub column_id: Uuid,
    pub position: i32,
}

#[derive(Debug, Serialize)]
pub struct ColumnView {
    pub id: Uuid,
    pub title: String,
    pub position: i32,
    pub color: Option<String>,
    pub tasks: Vec<TaskView>,
}

/// Full board read view: the board plus its columns and their active
/// tasks, both levels ordered ascending by position.
#[derive(Debug, Serialize)]
pub struct BoardView {
    pub board: BoardResponse,
    pub columns: Vec<ColumnView>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBoardCommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct BoardCommentResponse {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: Option<UserPreview>,
}
