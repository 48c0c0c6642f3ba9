use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    dto::tasks::{CreateTaskRequest, TaskPositionUpdate, UpdateSubtaskRequest, UpdateTaskRequest},
    error::AppError,
    models::tasks::{Subtask, Task},
    repositories::users::RecipientRow,
};

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SubtaskProgressRow {
    pub total: i64,
    pub completed: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ResponsiblePreviewRow {
    pub user_id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TaskCommentRow {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_id: Option<Uuid>,
    pub author_username: Option<String>,
    pub author_avatar_url: Option<String>,
}

/// A task matched by the due-date scan, joined to its column and board.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct DueTaskRow {
    pub task_id: Uuid,
    pub task_title: String,
    pub column_title: String,
    pub board_id: Uuid,
    pub board_title: String,
}

pub async fn create_task(
    tx: &mut Transaction<'_, Postgres>,
    column_id: Uuid,
    req: &CreateTaskRequest,
) -> Result<Task, AppError> {
    let task = crate::log_query_fetch_one!(
        "tasks.create_task",
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO board.task (
                column_id,
                title,
                description,
                position,
                due_date,
                priority,
                status,
                color
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(column_id)
        .bind(&req.title)
        .bind(req.description.as_deref())
        .bind(req.position)
        .bind(req.due_date)
        .bind(req.priority)
        .bind(req.status)
        .bind(req.color.as_deref())
        .fetch_one(&mut **tx)
    )?;

    Ok(task)
}

pub async fn find_task_by_id(pool: &PgPool, task_id: Uuid) -> Result<Option<Task>, AppError> {
    let task = crate::log_query_fetch_optional!(
        "tasks.find_task_by_id",
        sqlx::query_as::<_, Task>(
            r#"
            SELECT *
            FROM board.task
            WHERE id = $1
            "#,
        )
        .bind(task_id)
        .fetch_optional(pool)
    )?;

    Ok(task)
}

/// Tasks of a column, ascending by position. Ties keep insertion order.
pub async fn list_tasks_by_column(pool: &PgPool, column_id: Uuid) -> Result<Vec<Task>, AppError> {
    let tasks = crate::log_query_fetch_all!(
        "tasks.list_tasks_by_column",
        sqlx::query_as::<_, Task>(
            r#"
            SELECT *
            FROM board.task
            WHERE column_id = $1
            ORDER BY position ASC, created_at ASC
            "#,
        )
        .bind(column_id)
        .fetch_all(pool)
    )?;

    Ok(tasks)
}

/// Same as [`list_tasks_by_column`] minus tasks in a terminal status.
pub async fn list_active_tasks_by_column(
    pool: &PgPool,
    column_id: Uuid,
) -> Result<Vec<Task>, AppError> {
    let tasks = crate::log_query_fetch_all!(
        "tasks.list_active_tasks_by_column",
        sqlx::query_as::<_, Task>(
            r#"
            SELECT *
            FROM board.task
            WHERE column_id = $1
            AND status NOT IN ('done', 'reject')
            ORDER BY position ASC, created_at ASC
            "#,
        )
        .bind(column_id)
        .fetch_all(pool)
    )?;

    Ok(tasks)
}

/// Every task under the board whose status is in the given label set.
pub async fn list_tasks_by_status(
    pool: &PgPool,
    board_id: Uuid,
    status_labels: &[&str],
) -> Result<Vec<Task>, AppError> {
    let tasks = crate::log_query_fetch_all!(
        "tasks.list_tasks_by_status",
        sqlx::query_as::<_, Task>(
            r#"
            SELECT t.*
            FROM board.task t
            JOIN board.board_column c ON c.id = t.column_id
            WHERE c.board_id = $1
            AND t.status::text = ANY($2)
            ORDER BY t.position ASC, t.created_at ASC
            "#,
        )
        .bind(board_id)
        .bind(status_labels)
        .fetch_all(pool)
    )?;

    Ok(tasks)
}

pub async fn update_task_fields(
    pool: &PgPool,
    task_id: Uuid,
    req: &UpdateTaskRequest,
) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "tasks.update_task_fields",
        sqlx::query(
            r#"
            UPDATE board.task
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                due_date = COALESCE($4, due_date),
                priority = COALESCE($5, priority),
                status = COALESCE($6, status),
                color = COALESCE($7, color),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(task_id)
        .bind(req.title.as_deref())
        .bind(req.description.as_deref())
        .bind(req.due_date)
        .bind(req.priority)
        .bind(req.status)
        .bind(req.color.as_deref())
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}

/// Overwrites the owning column and position in one statement; moving a
/// task between columns and reordering it are the same write.
pub async fn set_task_position(
    pool: &PgPool,
    task_id: Uuid,
    column_id: Uuid,
    position: i32,
) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "tasks.set_task_position",
        sqlx::query(
            r#"
            UPDATE board.task
            SET column_id = $2,
                position = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(task_id)
        .bind(column_id)
        .bind(position)
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}

/// Applies a drag-and-drop batch as one logical unit.
pub async fn reposition_tasks(
    tx: &mut Transaction<'_, Postgres>,
    updates: &[TaskPositionUpdate],
) -> Result<u64, AppError> {
    let mut affected = 0;
    for update in updates {
        let result = crate::log_query_execute!(
            "tasks.reposition_tasks",
            sqlx::query(
                r#"
                UPDATE board.task
                SET column_id = $2,
                    position = $3,
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(update.task_id)
            .bind(update.column_id)
            .bind(update.position)
            .execute(&mut **tx)
        )?;
        affected += result.rows_affected();
    }

    Ok(affected)
}

pub async fn delete_task(pool: &PgPool, task_id: Uuid) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "tasks.delete_task",
        sqlx::query(
            r#"
            DELETE FROM board.task
            WHERE id = $1
            "#,
        )
        .bind(task_id)
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}

pub(crate) async fn subtask_progress(
    pool: &PgPool,
    task_id: Uuid,
) -> Result<SubtaskProgressRow, AppError> {
    let progress = crate::log_query_fetch_one!(
        "tasks.subtask_progress",
        sqlx::query_as::<_, SubtaskProgressRow>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE is_completed) AS completed
            FROM board.subtask
            WHERE task_id = $1
            "#,
        )
        .bind(task_id)
        .fetch_one(pool)
    )?;

    Ok(progress)
}

pub async fn count_comments(pool: &PgPool, task_id: Uuid) -> Result<i64, AppError> {
    let count = crate::log_query_fetch_one!(
        "tasks.count_comments",
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM board.task_comment
            WHERE task_id = $1
            "#,
        )
        .bind(task_id)
        .fetch_one(pool)
    )?;

    Ok(count)
}

pub async fn list_subtasks(pool: &PgPool, task_id: Uuid) -> Result<Vec<Subtask>, AppError> {
    let subtasks = crate::log_query_fetch_all!(
        "tasks.list_subtasks",
        sqlx::query_as::<_, Subtask>(
            r#"
            SELECT *
            FROM board.subtask
            WHERE task_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
    )?;

    Ok(subtasks)
}

pub async fn create_subtask(
    pool: &PgPool,
    task_id: Uuid,
    title: String,
    is_completed: bool,
) -> Result<Subtask, AppError> {
    let subtask = crate::log_query_fetch_one!(
        "tasks.create_subtask",
        sqlx::query_as::<_, Subtask>(
            r#"
            INSERT INTO board.subtask (task_id, title, is_completed)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(task_id)
        .bind(title)
        .bind(is_completed)
        .fetch_one(pool)
    )?;

    Ok(subtask)
}

pub async fn update_subtask_fields(
    pool: &PgPool,
    subtask_id: Uuid,
    req: &UpdateSubtaskRequest,
) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "tasks.update_subtask_fields",
        sqlx::query(
            r#"
            UPDATE board.subtask
            SET title = COALESCE($2, title),
                is_completed = COALESCE($3, is_completed)
            WHERE id = $1
            "#,
        )
        .bind(subtask_id)
        .bind(req.title.as_deref())
        .bind(req.is_completed)
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}

pub async fn delete_subtask(pool: &PgPool, subtask_id: Uuid) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "tasks.delete_subtask",
        sqlx::query(
            r#"
            DELETE FROM board.subtask
            WHERE id = $1
            "#,
        )
        .bind(subtask_id)
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}

pub async fn list_task_comments(
    pool: &PgPool,
    task_id: Uuid,
) -> Result<Vec<TaskCommentRow>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "tasks.list_task_comments",
        sqlx::query_as::<_, TaskCommentRow>(
            r#"
            SELECT
                tc.id,
                tc.content,
                tc.created_at,
                tc.author_id,
                u.username AS author_username,
                u.avatar_url AS author_avatar_url
            FROM board.task_comment tc
            LEFT JOIN core.user u ON u.id = tc.author_id
            WHERE tc.task_id = $1
            ORDER BY tc.created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
    )?;

    Ok(rows)
}

pub async fn create_comment(
    pool: &PgPool,
    task_id: Uuid,
    author_id: Uuid,
    content: String,
) -> Result<TaskCommentRow, AppError> {
    let row = crate::log_query_fetch_one!(
        "tasks.create_comment",
        sqlx::query_as::<_, TaskCommentRow>(
            r#"
            WITH inserted AS (
                INSERT INTO board.task_comment (task_id, author_id, content)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT
                inserted.id,
                inserted.content,
                inserted.created_at,
                inserted.author_id,
                u.username AS author_username,
                u.avatar_url AS author_avatar_url
            FROM inserted
            LEFT JOIN core.user u ON u.id = inserted.author_id
            "#,
        )
        .bind(task_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(pool)
    )?;

    Ok(row)
}

pub async fn delete_task_comment(pool: &PgPool, comment_id: Uuid) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "tasks.delete_task_comment",
        sqlx::query(
            r#"
            DELETE FROM board.task_comment
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}

pub async fn add_responsible(
    tx: &mut Transaction<'_, Postgres>,
    task_id: Uuid,
    user_id: Uuid,
) -> Result<(), AppError> {
    crate::log_query_execute!(
        "tasks.add_responsible",
        sqlx::query(
            r#"
            INSERT INTO board.task_responsible (task_id, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .execute(&mut **tx)
    )
    .map_err(map_responsible_unique_violation)?;

    Ok(())
}

pub async fn remove_responsible(
    pool: &PgPool,
    task_id: Uuid,
    user_id: Uuid,
) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "tasks.remove_responsible",
        sqlx::query(
            r#"
            DELETE FROM board.task_responsible
            WHERE task_id = $1
            AND user_id = $2
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}

pub(crate) async fn list_responsible_previews(
    pool: &PgPool,
    task_id: Uuid,
) -> Result<Vec<ResponsiblePreviewRow>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "tasks.list_responsible_previews",
        sqlx::query_as::<_, ResponsiblePreviewRow>(
            r#"
            SELECT u.id AS user_id, u.username, u.avatar_url
            FROM board.task_responsible tr
            JOIN core.user u ON u.id = tr.user_id
            WHERE tr.task_id = $1
            ORDER BY tr.created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
    )?;

    Ok(rows)
}

/// Tasks due exactly on the given date, excluding terminal statuses,
/// joined to column and board titles for message composition.
pub(crate) async fn tasks_due_on(
    pool: &PgPool,
    date: NaiveDate,
) -> Result<Vec<DueTaskRow>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "tasks.tasks_due_on",
        sqlx::query_as::<_, DueTaskRow>(
            r#"
            SELECT
                t.id AS task_id,
                t.title AS task_title,
                c.title AS column_title,
                b.id AS board_id,
                b.title AS board_title
            FROM board.task t
            JOIN board.board_column c ON c.id = t.column_id
            JOIN board.board b ON b.id = c.board_id
            WHERE t.due_date = $1
            AND t.status NOT IN ('done', 'reject')
            ORDER BY t.created_at ASC
            "#,
        )
        .bind(date)
        .fetch_all(pool)
    )?;

    Ok(rows)
}

/// The task's responsible users resolved to notification recipients.
pub(crate) async fn responsible_recipients(
    pool: &PgPool,
    task_id: Uuid,
) -> Result<Vec<RecipientRow>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "tasks.responsible_recipients",
        sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT u.id AS user_id, u.username, u.email
            FROM board.task_responsible tr
            JOIN core.user u ON u.id = tr.user_id
            WHERE tr.task_id = $1
            ORDER BY tr.created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
    )?;

    Ok(rows)
}

fn map_responsible_unique_violation(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                return AppError::Conflict("Task responsible already exists".to_string());
            }
            AppError::Database(err)
        }
        _ => err.into(),
    }
}
