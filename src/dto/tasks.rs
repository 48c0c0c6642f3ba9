use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    dto::boards::UserPreview,
    models::tasks::{Priority, Status},
};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub status: Status,
    pub color: Option<String>,
    pub responsible_id: Option<Uuid>,
}

/// Partial update: only supplied fields mutate.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub color: Option<String>,
}

impl UpdateTaskRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.color.is_none()
    }
}

/// One entry of a batch task reorder. Moving across columns and
/// repositioning are the same write: both fields are overwritten.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskPositionUpdate {
    pub task_id: Uuid,
    pub column_id: Uuid,
    pub position: i32,
}

/// Task payload inside board views: stored fields plus subtask progress,
/// comment count and responsible previews.
#[derive(Debug, Serialize)]
pub struct TaskView {
    pub id: Uuid,
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub status: Status,
    pub color: Option<String>,
    pub total_subtasks: i64,
    pub completed_subtasks: i64,
    pub comment_count: i64,
    pub responsibles: Vec<UserPreview>,
}

#[derive(Debug, Serialize)]
pub struct SubtaskResponse {
    pub id: Uuid,
    pub title: String,
    pub is_completed: bool,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: Option<UserPreview>,
}

/// Single-task read view with the full subtask and comment lists.
#[derive(Debug, Serialize)]
pub struct TaskDetail {
    pub id: Uuid,
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub status: Status,
    pub color: Option<String>,
    pub total_subtasks: i64,
    pub completed_subtasks: i64,
    pub subtasks: Vec<SubtaskResponse>,
    pub comments: Vec<CommentResponse>,
    pub responsibles: Vec<UserPreview>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateSubtaskRequest {
    pub title: String,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateSubtaskRequest {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
}

impl UpdateSubtaskRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.is_completed.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}
