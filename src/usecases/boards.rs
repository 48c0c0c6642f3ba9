use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dto::boards::{
        BoardCommentResponse, BoardMemberResponse, BoardResponse, BoardView, ColumnView,
        CreateBoardCommentRequest, CreateBoardRequest, UpdateBoardRequest, UserPreview,
    },
    dto::tasks::TaskView,
    error::AppError,
    models::{
        boards::{Board, BoardMember, BoardRole},
        tasks::Status,
    },
    repositories::boards as board_repo,
    repositories::columns as column_repo,
    repositories::tasks as task_repo,
    repositories::users as user_repo,
    usecases::tasks::{build_task_view, normalize_comment_content},
};

pub struct BoardService;

impl BoardService {
    /// Creates the board and its creator membership as one unit; neither
    /// row exists without the other.
    pub async fn create_board(
        pool: &PgPool,
        req: CreateBoardRequest,
        creator_id: Uuid,
    ) -> Result<BoardResponse, AppError> {
        user_repo::find_user_by_id(pool, creator_id)
            .await?
            .ok_or(AppError::NotFound("Creator user not found".to_string()))?;

        let mut tx = pool.begin().await?;
        let board = board_repo::create_board(&mut tx, req).await?;
        board_repo::add_creator_member(&mut tx, board.id, creator_id).await?;
        tx.commit().await?;

        Ok(map_board(board))
    }

    pub async fn get_board(pool: &PgPool, board_id: Uuid) -> Result<BoardResponse, AppError> {
        let board = board_repo::find_board_by_id(pool, board_id)
            .await?
            .ok_or(AppError::NotFound("Board not found".to_string()))?;

        Ok(map_board(board))
    }

    pub async fn list_boards(pool: &PgPool) -> Result<Vec<BoardResponse>, AppError> {
        let boards = board_repo::list_boards(pool).await?;

        Ok(boards.into_iter().map(map_board).collect())
    }

    /// Assembles the full board tree: columns ordered by position, the
    /// non-terminal tasks of each column ordered by position, and per
    /// task the subtask progress, comment count and responsibles. The
    /// ordering is recomputed on every call; positions change between
    /// calls during drag-and-drop.
    pub async fn get_full_board(pool: &PgPool, board_id: Uuid) -> Result<BoardView, AppError> {
        let board = board_repo::find_board_by_id(pool, board_id)
            .await?
            .ok_or(AppError::NotFound("Board not found".to_string()))?;

        let columns = column_repo::list_columns(pool, board_id).await?;
        let mut column_views = Vec::with_capacity(columns.len());
        for column in columns {
            let tasks = task_repo::list_tasks_by_column(pool, column.id).await?;
            let mut task_views = Vec::new();
            for task in tasks {
                if task.status.is_terminal() {
                    continue;
                }
                task_views.push(build_task_view(pool, task).await?);
            }
            column_views.push(ColumnView {
                id: column.id,
                title: column.title,
                position: column.position,
                color: column.color,
                tasks: task_views,
            });
        }

        Ok(BoardView {
            board: map_board(board),
            columns: column_views,
        })
    }

    /// Exactly the board's tasks whose status is in the given set; used
    /// to show done/rejected tasks outside the active board render.
    pub async fn get_tasks_by_status(
        pool: &PgPool,
        board_id: Uuid,
        statuses: &[Status],
    ) -> Result<Vec<TaskView>, AppError> {
        board_repo::find_board_by_id(pool, board_id)
            .await?
            .ok_or(AppError::NotFound("Board not found".to_string()))?;

        let labels: Vec<&str> = statuses.iter().map(|status| status.as_str()).collect();
        let tasks = task_repo::list_tasks_by_status(pool, board_id, &labels).await?;
        let mut views = Vec::with_capacity(tasks.len());
        for task in tasks {
            views.push(build_task_view(pool, task).await?);
        }

        Ok(views)
    }

    pub async fn update_board(
        pool: &PgPool,
        board_id: Uuid,
        req: UpdateBoardRequest,
    ) -> Result<(), AppError> {
        if req.is_empty() {
            return Err(AppError::InvalidInput(
                "Board update requires at least one field".to_string(),
            ));
        }

        let updated = board_repo::update_board_fields(pool, board_id, &req).await?;
        if updated == 0 {
            return Err(AppError::NotFound("Board not found".to_string()));
        }

        Ok(())
    }

    pub async fn delete_board(pool: &PgPool, board_id: Uuid) -> Result<(), AppError> {
        let deleted = board_repo::delete_board(pool, board_id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("Board not found".to_string()));
        }

        Ok(())
    }

    pub async fn list_members(
        pool: &PgPool,
        board_id: Uuid,
    ) -> Result<Vec<BoardMemberResponse>, AppError> {
        board_repo::find_board_by_id(pool, board_id)
            .await?
            .ok_or(AppError::NotFound("Board not found".to_string()))?;

        let rows = board_repo::list_members(pool, board_id).await?;

        Ok(rows
            .into_iter()
            .map(|row| BoardMemberResponse {
                user: UserPreview {
                    id: row.user_id,
                    username: row.username,
                    avatar_url: row.avatar_url,
                },
                role: row.role,
                created_at: row.created_at,
            })
            .collect())
    }

    pub async fn get_member_role(
        pool: &PgPool,
        board_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<BoardRole>, AppError> {
        board_repo::get_member_role(pool, board_id, user_id).await
    }

    pub async fn add_member(
        pool: &PgPool,
        board_id: Uuid,
        user_id: Uuid,
    ) -> Result<BoardMember, AppError> {
        board_repo::find_board_by_id(pool, board_id)
            .await?
            .ok_or(AppError::NotFound("Board not found".to_string()))?;
        user_repo::find_user_by_id(pool, user_id)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))?;

        board_repo::add_member(pool, board_id, user_id, BoardRole::Member).await
    }

    /// Existence is the only check; nothing prevents demoting the sole
    /// creator (the at-least-one-creator invariant holds at creation
    /// time only).
    pub async fn change_member_role(
        pool: &PgPool,
        board_id: Uuid,
        user_id: Uuid,
        role: BoardRole,
    ) -> Result<(), AppError> {
        let updated = board_repo::update_member_role(pool, board_id, user_id, role).await?;
        if updated == 0 {
            return Err(AppError::NotFound("Board membership not found".to_string()));
        }

        Ok(())
    }

    /// Removes the membership and the user's responsibility rows across
    /// every task under the board, in one transaction. The user record
    /// itself is untouched.
    pub async fn remove_member(
        pool: &PgPool,
        board_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = pool.begin().await?;
        board_repo::delete_member_responsibilities(&mut tx, board_id, user_id).await?;
        let removed = board_repo::remove_member(&mut tx, board_id, user_id).await?;
        if removed == 0 {
            return Err(AppError::NotFound("Board membership not found".to_string()));
        }
        tx.commit().await?;

        Ok(())
    }

    pub async fn write_board_comment(
        pool: &PgPool,
        board_id: Uuid,
        author_id: Uuid,
        req: CreateBoardCommentRequest,
    ) -> Result<BoardCommentResponse, AppError> {
        let content = normalize_comment_content(&req.content)?;
        board_repo::find_board_by_id(pool, board_id)
            .await?
            .ok_or(AppError::NotFound("Board not found".to_string()))?;
        user_repo::find_user_by_id(pool, author_id)
            .await?
            .ok_or(AppError::NotFound("Author not found".to_string()))?;

        let row = board_repo::create_board_comment(pool, board_id, author_id, content).await?;

        Ok(map_board_comment(row))
    }

    pub async fn list_board_comments(
        pool: &PgPool,
        board_id: Uuid,
    ) -> Result<Vec<BoardCommentResponse>, AppError> {
        board_repo::find_board_by_id(pool, board_id)
            .await?
            .ok_or(AppError::NotFound("Board not found".to_string()))?;

        let rows = board_repo::list_board_comments(pool, board_id).await?;

        Ok(rows.into_iter().map(map_board_comment).collect())
    }
}

fn map_board(board: Board) -> BoardResponse {
    BoardResponse {
        id: board.id,
        title: board.title,
        description: board.description,
        is_public: board.is_public,
        color: board.color,
        created_at: board.created_at,
        updated_at: board.updated_at,
    }
}

fn map_board_comment(row: board_repo::BoardCommentRow) -> BoardCommentResponse {
    let author = match (row.author_id, row.author_username) {
        (Some(id), Some(username)) => Some(UserPreview {
            id,
            username,
            avatar_url: row.author_avatar_url,
        }),
        _ => None,
    };

    BoardCommentResponse {
        id: row.id,
        content: row.content,
        created_at: row.created_at,
        author,
    }
}
