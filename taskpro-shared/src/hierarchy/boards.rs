use uuid::Uuid;

use super::{bounded_text, optional_text, required_text, BoardView, Hierarchy};
use crate::error::{CoreError, CoreResult};
use crate::models::board::{Board, CreateBoard, UpdateBoard};

/// Board creation input
#[derive(Debug, Clone)]
pub struct NewBoard {
    pub name: String,
    pub icon: String,
    pub background: Option<String>,
}

/// Partial board update
///
/// `background: Some(None)` clears the background.
#[derive(Debug, Clone, Default)]
pub struct BoardChanges {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub background: Option<Option<String>>,
}

const MAX_ICON_LEN: usize = 255;
const MAX_BACKGROUND_LEN: usize = 1024;

fn board_not_found() -> CoreError {
    CoreError::not_found("Board not found")
}

impl Hierarchy {
    /// Creates an empty board
    ///
    /// # Errors
    ///
    /// `Validation` for a blank name or an oversized icon / background,
    /// `Conflict` if the user already has a board with that name.
    pub async fn create_board(&self, user_id: Uuid, input: NewBoard) -> CoreResult<BoardView> {
        let name = required_text("name", &input.name)?;
        bounded_text("icon", &input.icon, MAX_ICON_LEN)?;
        if let Some(background) = &input.background {
            bounded_text("background", background, MAX_BACKGROUND_LEN)?;
        }

        let board = Board::create(
            &self.db,
            CreateBoard {
                user_id,
                name,
                icon: input.icon,
                background: input.background,
            },
        )
        .await?;

        tracing::info!(user_id = %user_id, board_id = %board.id, "Board created");

        Ok(BoardView {
            board,
            columns: Vec::new(),
        })
    }

    /// Every board of the user, fully hydrated
    ///
    /// Reads run in one REPEATABLE READ transaction so boards, columns and
    /// cards come from the same snapshot.
    pub async fn list_boards(&self, user_id: Uuid) -> CoreResult<Vec<BoardView>> {
        let mut tx = self.db.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let boards = Board::list_by_user(&mut *tx, user_id).await?;
        let views = Self::hydrate(&mut tx, boards).await?;

        tx.commit().await?;
        Ok(views)
    }

    /// One hydrated board
    pub async fn get_board(&self, user_id: Uuid, board_id: Uuid) -> CoreResult<BoardView> {
        let mut tx = self.db.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let board = Board::find_for_user(&mut *tx, board_id, user_id)
            .await?
            .ok_or_else(board_not_found)?;

        let view = Self::hydrate(&mut tx, vec![board])
            .await?
            .pop()
            .ok_or_else(board_not_found)?;

        tx.commit().await?;
        Ok(view)
    }

    /// Renames / re-icons / re-backgrounds a board
    ///
    /// # Errors
    ///
    /// `NotFound` if the board isn't the user's, `Conflict` when renaming to a
    /// name the user already uses.
    pub async fn update_board(
        &self,
        user_id: Uuid,
        board_id: Uuid,
        changes: BoardChanges,
    ) -> CoreResult<BoardView> {
        let name = optional_text("name", changes.name)?;
        if let Some(icon) = &changes.icon {
            bounded_text("icon", icon, MAX_ICON_LEN)?;
        }
        if let Some(Some(background)) = &changes.background {
            bounded_text("background", background, MAX_BACKGROUND_LEN)?;
        }

        let mut tx = self.db.begin().await?;

        Board::lock_for_user(&mut *tx, board_id, user_id)
            .await?
            .ok_or_else(board_not_found)?;

        let board = Board::update(
            &mut *tx,
            board_id,
            UpdateBoard {
                name,
                icon: changes.icon,
                background: changes.background,
            },
        )
        .await?
        .ok_or_else(board_not_found)?;

        let view = Self::hydrate(&mut tx, vec![board])
            .await?
            .pop()
            .ok_or_else(board_not_found)?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, board_id = %board_id, "Board updated");
        Ok(view)
    }

    /// Deletes a board together with its columns and cards
    pub async fn delete_board(&self, user_id: Uuid, board_id: Uuid) -> CoreResult<()> {
        let mut tx = self.db.begin().await?;

        Board::lock_for_user(&mut *tx, board_id, user_id)
            .await?
            .ok_or_else(board_not_found)?;

        Board::delete(&mut *tx, board_id).await?;
        tx.commit().await?;

        tracing::info!(user_id = %user_id, board_id = %board_id, "Board deleted");
        Ok(())
    }
}
