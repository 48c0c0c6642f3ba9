use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dto::boards::UserPreview,
    dto::tasks::{
        CommentResponse, CreateCommentRequest, CreateSubtaskRequest, CreateTaskRequest,
        SubtaskResponse, TaskDetail, TaskPositionUpdate, TaskView, UpdateSubtaskRequest,
        UpdateTaskRequest,
    },
    error::AppError,
    models::tasks::{Subtask, Task},
    repositories::boards as board_repo,
    repositories::columns as column_repo,
    repositories::tasks as task_repo,
    repositories::users as user_repo,
};

pub struct TaskService;

impl TaskService {
    /// Creates the task and, when a responsible user is supplied, its
    /// responsibility row in the same transaction.
    pub async fn create_task(
        pool: &PgPool,
        column_id: Uuid,
        req: CreateTaskRequest,
    ) -> Result<Task, AppError> {
        column_repo::find_column_by_id(pool, column_id)
            .await?
            .ok_or(AppError::NotFound("Column not found".to_string()))?;
        if let Some(responsible_id) = req.responsible_id {
            user_repo::find_user_by_id(pool, responsible_id)
                .await?
                .ok_or(AppError::NotFound("Responsible user not found".to_string()))?;
        }

        let mut tx = pool.begin().await?;
        let task = task_repo::create_task(&mut tx, column_id, &req).await?;
        if let Some(responsible_id) = req.responsible_id {
            task_repo::add_responsible(&mut tx, task.id, responsible_id).await?;
        }
        tx.commit().await?;

        Ok(task)
    }

    pub async fn get_full_task(pool: &PgPool, task_id: Uuid) -> Result<TaskDetail, AppError> {
        let task = task_repo::find_task_by_id(pool, task_id)
            .await?
            .ok_or(AppError::NotFound("Task not found".to_string()))?;

        let subtasks = task_repo::list_subtasks(pool, task_id).await?;
        let comments = task_repo::list_task_comments(pool, task_id).await?;
        let responsibles = task_repo::list_responsible_previews(pool, task_id).await?;
        let total_subtasks = subtasks.len() as i64;
        let completed_subtasks = subtasks.iter().filter(|s| s.is_completed).count() as i64;

        Ok(TaskDetail {
            id: task.id,
            column_id: task.column_id,
            title: task.title,
            description: task.description,
            position: task.position,
            due_date: task.due_date,
            priority: task.priority,
            status: task.status,
            color: task.color,
            total_subtasks,
            completed_subtasks,
            subtasks: subtasks.into_iter().map(map_subtask).collect(),
            comments: comments.into_iter().map(map_task_comment).collect(),
            responsibles: responsibles.into_iter().map(map_responsible).collect(),
        })
    }

    pub async fn update_task(
        pool: &PgPool,
        task_id: Uuid,
        req: UpdateTaskRequest,
    ) -> Result<(), AppError> {
        if req.is_empty() {
            return Err(AppError::InvalidInput(
                "Task update requires at least one field".to_string(),
            ));
        }

        let updated = task_repo::update_task_fields(pool, task_id, &req).await?;
        if updated == 0 {
            return Err(AppError::NotFound("Task not found".to_string()));
        }

        Ok(())
    }

    /// Overwrites the owning column and position with the supplied
    /// values; siblings are never renumbered.
    pub async fn set_task_position(
        pool: &PgPool,
        task_id: Uuid,
        column_id: Uuid,
        position: i32,
    ) -> Result<(), AppError> {
        column_repo::find_column_by_id(pool, column_id)
            .await?
            .ok_or(AppError::NotFound("Column not found".to_string()))?;

        let updated = task_repo::set_task_position(pool, task_id, column_id, position).await?;
        if updated == 0 {
            return Err(AppError::NotFound("Task not found".to_string()));
        }

        Ok(())
    }

    /// Applies a drag-and-drop batch of absolute (task, column, position)
    /// values as one logical unit.
    pub async fn reposition_tasks(
        pool: &PgPool,
        updates: Vec<TaskPositionUpdate>,
    ) -> Result<u64, AppError> {
        let mut tx = pool.begin().await?;
        let affected = task_repo::reposition_tasks(&mut tx, &updates).await?;
        tx.commit().await?;

        Ok(affected)
    }

    pub async fn delete_task(pool: &PgPool, task_id: Uuid) -> Result<(), AppError> {
        let deleted = task_repo::delete_task(pool, task_id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("Task not found".to_string()));
        }

        Ok(())
    }

    pub async fn create_subtask(
        pool: &PgPool,
        task_id: Uuid,
        req: CreateSubtaskRequest,
    ) -> Result<Subtask, AppError> {
        task_repo::find_task_by_id(pool, task_id)
            .await?
            .ok_or(AppError::NotFound("Task not found".to_string()))?;

        task_repo::create_subtask(pool, task_id, req.title, req.is_completed).await
    }

    pub async fn update_subtask(
        pool: &PgPool,
        subtask_id: Uuid,
        req: UpdateSubtaskRequest,
    ) -> Result<(), AppError> {
        if req.is_empty() {
            return Err(AppError::InvalidInput(
                "Subtask update requires at least one field".to_string(),
            ));
        }

        let updated = task_repo::update_subtask_fields(pool, subtask_id, &req).await?;
        if updated == 0 {
            return Err(AppError::NotFound("Subtask not found".to_string()));
        }

        Ok(())
    }

    pub async fn delete_subtask(pool: &PgPool, subtask_id: Uuid) -> Result<(), AppError> {
        let deleted = task_repo::delete_subtask(pool, subtask_id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("Subtask not found".to_string()));
        }

        Ok(())
    }

    pub async fn create_comment(
        pool: &PgPool,
        task_id: Uuid,
        author_id: Uuid,
        req: CreateCommentRequest,
    ) -> Result<CommentResponse, AppError> {
        let content = normalize_comment_content(&req.content)?;
        task_repo::find_task_by_id(pool, task_id)
            .await?
            .ok_or(AppError::NotFound("Task not found".to_string()))?;
        user_repo::find_user_by_id(pool, author_id)
            .await?
            .ok_or(AppError::NotFound("Author not found".to_string()))?;

        let row = task_repo::create_comment(pool, task_id, author_id, content).await?;

        Ok(map_task_comment(row))
    }

    /// Deletes a comment by id, resolving either comment kind: task
    /// comments first, board comments as fallback.
    pub async fn delete_comment(pool: &PgPool, comment_id: Uuid) -> Result<(), AppError> {
        if task_repo::delete_task_comment(pool, comment_id).await? > 0 {
            return Ok(());
        }
        if board_repo::delete_board_comment(pool, comment_id).await? > 0 {
            return Ok(());
        }

        Err(AppError::NotFound("Comment not found".to_string()))
    }

    pub async fn add_responsible(
        pool: &PgPool,
        task_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        task_repo::find_task_by_id(pool, task_id)
            .await?
            .ok_or(AppError::NotFound("Task not found".to_string()))?;
        user_repo::find_user_by_id(pool, user_id)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))?;

        let mut tx = pool.begin().await?;
        task_repo::add_responsible(&mut tx, task_id, user_id).await?;
        tx.commit().await?;

        Ok(())
    }

    pub async fn remove_responsible(
        pool: &PgPool,
        task_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        let removed = task_repo::remove_responsible(pool, task_id, user_id).await?;
        if removed == 0 {
            return Err(AppError::NotFound("Task responsible not found".to_string()));
        }

        Ok(())
    }
}

/// Task payload for board views: one progress query, one comment count
/// and one responsibles lookup per task. Fan-out reads are acceptable at
/// this scale; batch by column if a caller ever needs bulk throughput.
pub(crate) async fn build_task_view(pool: &PgPool, task: Task) -> Result<TaskView, AppError> {
    let progress = task_repo::subtask_progress(pool, task.id).await?;
    let comment_count = task_repo::count_comments(pool, task.id).await?;
    let responsibles = task_repo::list_responsible_previews(pool, task.id).await?;

    Ok(TaskView {
        id: task.id,
        column_id: task.column_id,
        title: task.title,
        description: task.description,
        position: task.position,
        due_date: task.due_date,
        priority: task.priority,
        status: task.status,
        color: task.color,
        total_subtasks: progress.total,
        completed_subtasks: progress.completed,
        comment_count,
        responsibles: responsibles.into_iter().map(map_responsible).collect(),
    })
}

pub(crate) fn normalize_comment_content(content: &str) -> Result<String, AppError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(
            "Comment content is required".to_string(),
        ));
    }

    Ok(trimmed.to_string())
}

fn map_subtask(subtask: Subtask) -> SubtaskResponse {
    SubtaskResponse {
        id: subtask.id,
        title: subtask.title,
        is_completed: subtask.is_completed,
    }
}

fn map_task_comment(row: task_repo::TaskCommentRow) -> CommentResponse {
    let author = match (row.author_id, row.author_username) {
        (Some(id), Some(username)) => Some(UserPreview {
            id,
            username,
            avatar_url: row.author_avatar_url,
        }),
        _ => None,
    };

    CommentResponse {
        id: row.id,
        content: row.content,
        created_at: row.created_at,
        author,
    }
}

fn map_responsible(row: task_repo::ResponsiblePreviewRow) -> UserPreview {
    UserPreview {
        id: row.user_id,
        username: row.username,
        avatar_url: row.avatar_url,
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_comment_content;
    use crate::error::AppError;

    #[test]
    fn rejects_blank_comment_content() {
        let result = normalize_comment_content("   ");
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn trims_comment_content() {
        let content = normalize_comment_content("  needs review ").expect("valid");
        assert_eq!(content, "needs review");
    }
}
