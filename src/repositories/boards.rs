use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    dto::boards::{CreateBoardRequest, UpdateBoardRequest},
    error::AppError,
    models::boards::{Board, BoardMember, BoardRole},
    repositories::users::RecipientRow,
};

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct BoardMemberRow {
    pub user_id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    pub role: BoardRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct BoardCommentRow {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_id: Option<Uuid>,
    pub author_username: Option<String>,
    pub author_avatar_url: Option<String>,
}

pub async fn create_board(
    tx: &mut Transaction<'_, Postgres>,
    req: CreateBoardRequest,
) -> Result<Board, AppError> {
    let board = crate::log_query_fetch_one!(
        "boards.create_board",
        sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO board.board (title, description, is_public, color)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(req.title)
        .bind(req.description)
        .bind(req.is_public)
        .bind(req.color)
        .fetch_one(&mut **tx)
    )?;

    Ok(board)
}

pub async fn add_creator_member(
    tx: &mut Transaction<'_, Postgres>,
    board_id: Uuid,
    user_id: Uuid,
) -> Result<(), AppError> {
    crate::log_query_execute!(
        "boards.add_creator_member",
        sqlx::query(
            r#"
            INSERT INTO board.board_member (board_id, user_id, role)
            VALUES ($1, $2, 'creator')
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .execute(&mut **tx)
    )
    .map_err(|err| map_member_unique_violation(err, "Board creator membership already exists"))?;

    Ok(())
}

pub async fn find_board_by_id(pool: &PgPool, board_id: Uuid) -> Result<Option<Board>, AppError> {
    let board = crate::log_query_fetch_optional!(
        "boards.find_board_by_id",
        sqlx::query_as::<_, Board>(
            r#"
            SELECT *
            FROM board.board
            WHERE id = $1
            "#,
        )
        .bind(board_id)
        .fetch_optional(pool)
    )?;

    Ok(board)
}

pub async fn list_boards(pool: &PgPool) -> Result<Vec<Board>, AppError> {
    let boards = crate::log_query_fetch_all!(
        "boards.list_boards",
        sqlx::query_as::<_, Board>(
            r#"
            SELECT *
            FROM board.board
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
    )?;

    Ok(boards)
}

pub async fn update_board_fields(
    pool: &PgPool,
    board_id: Uuid,
    req: &UpdateBoardRequest,
) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "boards.update_board_fields",
        sqlx::query(
            r#"
            UPDATE board.board
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                is_public = COALESCE($4, is_public),
                color = COALESCE($5, color),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(board_id)
        .bind(req.title.as_deref())
        .bind(req.description.as_deref())
        .bind(req.is_public)
        .bind(req.color.as_deref())
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}

pub async fn delete_board(pool: &PgPool, board_id: Uuid) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "boards.delete_board",
        sqlx::query(
            r#"
            DELETE FROM board.board
            WHERE id = $1
            "#,
        )
        .bind(board_id)
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}

pub async fn get_member_role(
    pool: &PgPool,
    board_id: Uuid,
    user_id: Uuid,
) -> Result<Option<BoardRole>, AppError> {
    let role = crate::log_query_fetch_optional!(
        "boards.get_member_role",
        sqlx::query_scalar::<_, BoardRole>(
            r#"
            SELECT role
            FROM board.board_member
            WHERE board_id = $1
            AND user_id = $2
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_optional(pool)
    )?;

    Ok(role)
}

pub async fn list_members(
    pool: &PgPool,
    board_id: Uuid,
) -> Result<Vec<BoardMemberRow>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "boards.list_members",
        sqlx::query_as::<_, BoardMemberRow>(
            r#"
            SELECT
                u.id AS user_id,
                u.username,
                u.avatar_url,
                bm.role,
                bm.created_at
            FROM board.board_member bm
            JOIN core.user u ON u.id = bm.user_id
            WHERE bm.board_id = $1
            ORDER BY bm.created_at ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
    )?;

    Ok(rows)
}

pub async fn add_member(
    pool: &PgPool,
    board_id: Uuid,
    user_id: Uuid,
    role: BoardRole,
) -> Result<BoardMember, AppError> {
    let member = crate::log_query_fetch_one!(
        "boards.add_member",
        sqlx::query_as::<_, BoardMember>(
            r#"
            INSERT INTO board.board_member (board_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING board_id, user_id, role, created_at
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(pool)
    )
    .map_err(|err| map_member_unique_violation(err, "Board member already exists"))?;

    Ok(member)
}

pub async fn update_member_role(
    pool: &PgPool,
    board_id: Uuid,
    user_id: Uuid,
    role: BoardRole,
) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "boards.update_member_role",
        sqlx::query(
            r#"
            UPDATE board.board_member
            SET role = $3
            WHERE board_id = $1
            AND user_id = $2
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .bind(role)
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}

pub async fn remove_member(
    tx: &mut Transaction<'_, Postgres>,
    board_id: Uuid,
    user_id: Uuid,
) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "boards.remove_member",
        sqlx::query(
            r#"
            DELETE FROM board.board_member
            WHERE board_id = $1
            AND user_id = $2
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .execute(&mut **tx)
    )?;

    Ok(result.rows_affected())
}

/// Clears the user's responsibility rows for every task under the board.
/// Responsibility is scoped to the board only through task -> column ->
/// board, so this cannot be an FK cascade and runs in the same
/// transaction as the membership delete.
pub async fn delete_member_responsibilities(
    tx: &mut Transaction<'_, Postgres>,
    board_id: Uuid,
    user_id: Uuid,
) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "boards.delete_member_responsibilities",
        sqlx::query(
            r#"
            DELETE FROM board.task_responsible tr
            USING board.task t, board.board_column c
            WHERE tr.task_id = t.id
            AND t.column_id = c.id
            AND c.board_id = $1
            AND tr.user_id = $2
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .execute(&mut **tx)
    )?;

    Ok(result.rows_affected())
}

/// The board's creator membership resolved to a notification recipient.
pub(crate) async fn find_board_creator(
    pool: &PgPool,
    board_id: Uuid,
) -> Result<Option<RecipientRow>, AppError> {
    let creator = crate::log_query_fetch_optional!(
        "boards.find_board_creator",
        sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT u.id AS user_id, u.username, u.email
            FROM board.board_member bm
            JOIN core.user u ON u.id = bm.user_id
            WHERE bm.board_id = $1
            AND bm.role = 'creator'
            LIMIT 1
            "#,
        )
        .bind(board_id)
        .fetch_optional(pool)
    )?;

    Ok(creator)
}

pub async fn create_board_comment(
    pool: &PgPool,
    board_id: Uuid,
    author_id: Uuid,
    content: String,
) -> Result<BoardCommentRow, AppError> {
    let row = crate::log_query_fetch_one!(
        "boards.create_board_comment",
        sqlx::query_as::<_, BoardCommentRow>(
            r#"
            WITH inserted AS (
                INSERT INTO board.board_comment (board_id, author_id, content)
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
        .bind(board_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(pool)
    )?;

    Ok(row)
}

pub async fn list_board_comments(
    pool: &PgPool,
    board_id: Uuid,
) -> Result<Vec<BoardCommentRow>, AppError> {
    let rows = crate::log_query_fetch_all!(
        "boards.list_board_comments",
        sqlx::query_as::<_, BoardCommentRow>(
            r#"
            SELECT
                bc.id,
                bc.content,
                bc.created_at,
                bc.author_id,
                u.username AS author_username,
                u.avatar_url AS author_avatar_url
            FROM board.board_comment bc
            LEFT JOIN core.user u ON u.id = bc.author_id
            WHERE bc.board_id = $1
            ORDER BY bc.created_at ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
    )?;

    Ok(rows)
}

pub async fn delete_board_comment(pool: &PgPool, comment_id: Uuid) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "boards.delete_board_comment",
        sqlx::query(
            r#"
            DELETE FROM board.board_comment
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}

fn map_member_unique_violation(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                return AppError::Conflict(message.to_string());
            }
            AppError::Database(err)
        }
        _ => err.into(),
    }
}
