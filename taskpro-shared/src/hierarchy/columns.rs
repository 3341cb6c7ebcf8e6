use uuid::Uuid;

use super::{clamp_position, required_text, BoardView, ColumnView, Hierarchy};
use crate::error::{CoreError, CoreResult};
use crate::models::board::Board;
use crate::models::column::Column;

/// Column creation input
#[derive(Debug, Clone)]
pub struct NewColumn {
    pub name: String,
}

/// Column update input
#[derive(Debug, Clone)]
pub struct ColumnChanges {
    pub name: String,
}

fn column_not_found() -> CoreError {
    CoreError::not_found("Column not found")
}

impl Hierarchy {
    /// Appends a column to the board
    ///
    /// # Errors
    ///
    /// `NotFound` if the board isn't the user's, `Conflict` if the board
    /// already has a column with that name.
    pub async fn create_column(
        &self,
        user_id: Uuid,
        board_id: Uuid,
        input: NewColumn,
    ) -> CoreResult<ColumnView> {
        let name = required_text("name", &input.name)?;

        let mut tx = self.db.begin().await?;

        Board::lock_for_user(&mut *tx, board_id, user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Board not found"))?;

        let position = Column::next_position(&mut *tx, board_id).await?;
        let column = Column::create(&mut *tx, board_id, &name, position).await?;

        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            board_id = %board_id,
            column_id = %column.id,
            position,
            "Column created"
        );

        Ok(ColumnView {
            column,
            cards: Vec::new(),
        })
    }

    /// Renames a column
    pub async fn update_column(
        &self,
        user_id: Uuid,
        column_id: Uuid,
        changes: ColumnChanges,
    ) -> CoreResult<Column> {
        let name = required_text("name", &changes.name)?;

        Column::find_for_user(&self.db, column_id, user_id)
            .await?
            .ok_or_else(column_not_found)?;

        let column = Column::rename(&self.db, column_id, &name)
            .await?
            .ok_or_else(column_not_found)?;

        tracing::info!(user_id = %user_id, column_id = %column_id, "Column renamed");
        Ok(column)
    }

    /// Deletes a column and its cards, then closes the gap it leaves
    pub async fn delete_column(&self, user_id: Uuid, column_id: Uuid) -> CoreResult<()> {
        let mut tx = self.db.begin().await?;
        let column = self.lock_column_board(&mut tx, user_id, column_id).await?;

        Column::delete(&mut *tx, column.id).await?;
        Column::close_gap(&mut *tx, column.board_id, column.position).await?;

        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            board_id = %column.board_id,
            column_id = %column_id,
            "Column deleted"
        );
        Ok(())
    }

    /// Moves a column to `position` within its board
    ///
    /// Out-of-range positions are clamped. Returns the board as it now stands.
    pub async fn reorder_column(
        &self,
        user_id: Uuid,
        column_id: Uuid,
        position: i32,
    ) -> CoreResult<BoardView> {
        let mut tx = self.db.begin().await?;
        let column = self.lock_column_board(&mut tx, user_id, column_id).await?;

        let last = Column::next_position(&mut *tx, column.board_id).await? - 1;
        let target = clamp_position(Some(position), last);
        let current = column.position;

        if target < current {
            Column::shift_between(&mut *tx, column.board_id, target, current - 1, 1).await?;
        } else if target > current {
            Column::shift_between(&mut *tx, column.board_id, current + 1, target, -1).await?;
        }
        if target != current {
            Column::set_position(&mut *tx, column.id, target).await?;
        }

        let board = Board::find_for_user(&mut *tx, column.board_id, user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Board not found"))?;
        let view = Self::hydrate(&mut tx, vec![board])
            .await?
            .pop()
            .ok_or_else(|| CoreError::not_found("Board not found"))?;

        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            board_id = %column.board_id,
            column_id = %column_id,
            from = current,
            to = target,
            "Column reordered"
        );
        Ok(view)
    }

    /// Locks the board a column belongs to and re-reads the column under it
    ///
    /// The second read sees the column's position as of the lock.
    async fn lock_column_board(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
        column_id: Uuid,
    ) -> CoreResult<Column> {
        let column = Column::find_for_user(&mut **tx, column_id, user_id)
            .await?
            .ok_or_else(column_not_found)?;

        Board::lock_for_user(&mut **tx, column.board_id, user_id)
            .await?
            .ok_or_else(column_not_found)?;

        Column::find_for_user(&mut **tx, column_id, user_id)
            .await?
            .ok_or_else(column_not_found)
    }
}
