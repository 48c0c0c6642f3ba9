use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Board member role mapping for board.board_role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "board.board_role", rename_all = "lowercase")]
pub enum BoardRole {
    Creator,
    Moderator,
    Member,
}

impl BoardRole {
    /// Returns true when the role is allowed to manage board membership.
    pub fn can_manage_members(self) -> bool {
        matches!(self, Self::Creator | Self::Moderator)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Board {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership row tying a user to a board. One creator per board,
/// inserted in the same transaction as the board itself.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BoardMember {
    pub board_id: Uuid,
    pub user_id: Uuid,
    pub role: BoardRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Column {
    pub id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub position: i32,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Board-scoped comment. The author reference is weak: deleting the
/// author nulls it out and the comment survives.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BoardComment {
    pub id: Uuid,
    pub board_id: Uuid,
    pub author_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::BoardRole;

    #[test]
    fn membership_management_is_gated_by_role() {
        assert!(BoardRole::Creator.can_manage_members());
        assert!(BoardRole::Moderator.can_manage_members());
        assert!(!BoardRole::Member.can_manage_members());
    }
}
