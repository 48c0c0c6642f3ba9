use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dto::boards::{ColumnPositionUpdate, CreateColumnRequest, UpdateColumnRequest},
    error::AppError,
    models::boards::Column,
    repositories::boards as board_repo,
    repositories::columns as column_repo,
};

pub struct ColumnService;

impl ColumnService {
    pub async fn create_column(
        pool: &PgPool,
        board_id: Uuid,
        req: CreateColumnRequest,
    ) -> Result<Column, AppError> {
        board_repo::find_board_by_id(pool, board_id)
            .await?
            .ok_or(AppError::NotFound("Board not found".to_string()))?;

        column_repo::create_column(pool, board_id, req).await
    }

    pub async fn list_columns(pool: &PgPool, board_id: Uuid) -> Result<Vec<Column>, AppError> {
        board_repo::find_board_by_id(pool, board_id)
            .await?
            .ok_or(AppError::NotFound("Board not found".to_string()))?;

        column_repo::list_columns(pool, board_id).await
    }

    pub async fn update_column(
        pool: &PgPool,
        column_id: Uuid,
        req: UpdateColumnRequest,
    ) -> Result<(), AppError> {
        if req.is_empty() {
            return Err(AppError::InvalidInput(
                "Column update requires at least one field".to_string(),
            ));
        }

        let updated = column_repo::update_column_fields(pool, column_id, &req).await?;
        if updated == 0 {
            return Err(AppError::NotFound("Column not found".to_string()));
        }

        Ok(())
    }

    /// Writes the caller-supplied position as-is; gaps and ties are
    /// tolerated and siblings are never renumbered.
    pub async fn set_column_position(
        pool: &PgPool,
        column_id: Uuid,
        position: i32,
    ) -> Result<(), AppError> {
        let updated = column_repo::set_column_position(pool, column_id, position).await?;
        if updated == 0 {
            return Err(AppError::NotFound("Column not found".to_string()));
        }

        Ok(())
    }

    /// Applies a full column ordering supplied by the caller as one
    /// logical unit.
    pub async fn reposition_columns(
        pool: &PgPool,
        updates: Vec<ColumnPositionUpdate>,
    ) -> Result<u64, AppError> {
        let mut tx = pool.begin().await?;
        let affected = column_repo::reposition_columns(&mut tx, &updates).await?;
        tx.commit().await?;

        Ok(affected)
    }

    pub async fn delete_column(pool: &PgPool, column_id: Uuid) -> Result<(), AppError> {
        let deleted = column_repo::delete_column(pool, column_id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("Column not found".to_string()));
        }

        Ok(())
    }
}
