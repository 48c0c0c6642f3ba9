use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Task priority mapping for board.task_priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "board.task_priority", rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Task status mapping for board.task_status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "board.task_status", rename_all = "snake_case")]
pub enum Status {
    ToDo,
    InProgress,
    Done,
    Reject,
}

impl Status {
    /// Terminal statuses are excluded from the active board view and from
    /// due-date scanning.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Reject)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "to_do",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub status: Status,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subtask {
    pub id: Uuid,
    pub task_id: Uuid,
    pub title: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Task-scoped comment with a weak author reference.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub task_id: Uuid,
    pub author_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::Status;

    #[test]
    fn done_and_reject_are_terminal() {
        assert!(Status::Done.is_terminal());
        assert!(Status::Reject.is_terminal());
        assert!(!Status::ToDo.is_terminal());
        assert!(!Status::InProgress.is_terminal());
    }

    #[test]
    fn status_labels_match_storage_values() {
        assert_eq!(Status::ToDo.as_str(), "to_do");
        assert_eq!(Status::InProgress.as_str(), "in_progress");
        assert_eq!(Status::Done.as_str(), "done");
        assert_eq!(Status::Reject.as_str(), "reject");
    }
}
