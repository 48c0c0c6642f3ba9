use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    dto::boards::{ColumnPositionUpdate, CreateColumnRequest, UpdateColumnRequest},
    error::AppError,
    models::boards::Column,
};

pub async fn create_column(
    pool: &PgPool,
    board_id: Uuid,
    req: CreateColumnRequest,
) -> Result<Column, AppError> {
    let column = crate::log_query_fetch_one!(
        "columns.create_column",
        sqlx::query_as::<_, Column>(
            r#"
            INSERT INTO board.board_column (board_id, title, position, color)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(board_id)
        .bind(req.title)
        .bind(req.position)
        .bind(req.color)
        .fetch_one(pool)
    )?;

    Ok(column)
}

pub async fn find_column_by_id(
    pool: &PgPool,
    column_id: Uuid,
) -> Result<Option<Column>, AppError> {
    let column = crate::log_query_fetch_optional!(
        "columns.find_column_by_id",
        sqlx::query_as::<_, Column>(
            r#"
            SELECT *
            FROM board.board_column
            WHERE id = $1
            "#,
        )
        .bind(column_id)
        .fetch_optional(pool)
    )?;

    Ok(column)
}

/// Columns for a board, ascending by position. Ties keep insertion order.
pub async fn list_columns(pool: &PgPool, board_id: Uuid) -> Result<Vec<Column>, AppError> {
    let columns = crate::log_query_fetch_all!(
        "columns.list_columns",
        sqlx::query_as::<_, Column>(
            r#"
            SELECT *
            FROM board.board_column
            WHERE board_id = $1
            ORDER BY position ASC, created_at ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
    )?;

    Ok(columns)
}

pub async fn update_column_fields(
    pool: &PgPool,
    column_id: Uuid,
    req: &UpdateColumnRequest,
) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "columns.update_column_fields",
        sqlx::query(
            r#"
            UPDATE board.board_column
            SET title = COALESCE($2, title),
                color = COALESCE($3, color)
            WHERE id = $1
            "#,
        )
        .bind(column_id)
        .bind(req.title.as_deref())
        .bind(req.color.as_deref())
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}

/// Overwrites the stored position with the caller-supplied value. No
/// sibling renumbering and no bounds or uniqueness checks.
pub async fn set_column_position(
    pool: &PgPool,
    column_id: Uuid,
    position: i32,
) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "columns.set_column_position",
        sqlx::query(
            r#"
            UPDATE board.board_column
            SET position = $2
            WHERE id = $1
            "#,
        )
        .bind(column_id)
        .bind(position)
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}

/// Applies a batch of absolute positions as one logical unit.
pub async fn reposition_columns(
    tx: &mut Transaction<'_, Postgres>,
    updates: &[ColumnPositionUpdate],
) -> Result<u64, AppError> {
    let mut affected = 0;
    for update in updates {
        let result = crate::log_query_execute!(
            "columns.reposition_columns",
            sqlx::query(
                r#"
                UPDATE board.board_column
                SET position = $2
                WHERE id = $1
                "#,
            )
            .bind(update.column_id)
            .bind(update.position)
            .execute(&mut **tx)
        )?;
        affected += result.rows_affected();
    }

    Ok(affected)
}

pub async fn delete_column(pool: &PgPool, column_id: Uuid) -> Result<u64, AppError> {
    let result = crate::log_query_execute!(
        "columns.delete_column",
        sqlx::query(
            r#"
            DELETE FROM board.board_column
            WHERE id = $1
            "#,
        )
        .bind(column_id)
        .execute(pool)
    )?;

    Ok(result.rows_affected())
}
