/// Column model and database operations
///
/// A column belongs to one board and holds a dense `position` (0..n-1) among
/// its siblings. Cards reference the column through `cards.column_id`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE board_columns (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     name VARCHAR(100) NOT NULL,
///     position INTEGER NOT NULL CHECK (position >= 0),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT columns_board_name_unique UNIQUE (board_id, name)
/// );
/// ```
///
/// Position bookkeeping (`next_position`, `close_gap`, `shift_between`) assumes the
/// caller holds the parent board's row lock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

const COLUMN_FIELDS: &str = "c.id, c.board_id, c.name, c.position, c.created_at, c.updated_at";

/// Column within a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Unique column ID
    pub id: Uuid,

    /// Owning board
    #[serde(rename = "owner")]
    pub board_id: Uuid,

    /// Name, unique per board
    pub name: String,

    /// Zero-based index among the board's columns
    pub position: i32,

    /// When the column was created
    pub created_at: DateTime<Utc>,

    /// When the column was last updated
    pub updated_at: DateTime<Utc>,
}

impl Column {
    /// Inserts a column at `position`
    ///
    /// # Errors
    ///
    /// Unique violation on `columns_board_name_unique` for a duplicate name.
    pub async fn create<'e, E>(
        executor: E,
        board_id: Uuid,
        name: &str,
        position: i32,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO board_columns AS c (board_id, name, position)
             VALUES ($1, $2, $3)
             RETURNING {COLUMN_FIELDS}"
        );

        sqlx::query_as::<_, Column>(&query)
            .bind(board_id)
            .bind(name)
            .bind(position)
            .fetch_one(executor)
            .await
    }

    /// Finds a column if its board belongs to `user_id`
    pub async fn find_for_user<'e, E>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMN_FIELDS}
             FROM board_columns c
             JOIN boards b ON b.id = c.board_id
             WHERE c.id = $1 AND b.user_id = $2"
        );

        sqlx::query_as::<_, Column>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    /// Locks the given columns (owned by `user_id`) in id order
    ///
    /// Locking in a fixed order keeps two concurrent moves between the same
    /// pair of columns from deadlocking. Columns that don't exist or belong to
    /// someone else are simply absent from the result.
    pub async fn lock_for_user<'e, E>(
        executor: E,
        ids: &[Uuid],
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMN_FIELDS}
             FROM board_columns c
             JOIN boards b ON b.id = c.board_id
             WHERE c.id = ANY($1) AND b.user_id = $2
             ORDER BY c.id
             FOR UPDATE OF c"
        );

        sqlx::query_as::<_, Column>(&query)
            .bind(ids)
            .bind(user_id)
            .fetch_all(executor)
            .await
    }

    /// Lists the columns of several boards, grouped by board and ordered by position
    pub async fn list_by_boards<'e, E>(
        executor: E,
        board_ids: &[Uuid],
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMN_FIELDS}
             FROM board_columns c
             WHERE c.board_id = ANY($1)
             ORDER BY c.board_id, c.position"
        );

        sqlx::query_as::<_, Column>(&query)
            .bind(board_ids)
            .fetch_all(executor)
            .await
    }

    /// Position one past the board's last column
    pub async fn next_position<'e, E>(executor: E, board_id: Uuid) -> Result<i32, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i32>(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM board_columns WHERE board_id = $1",
        )
        .bind(board_id)
        .fetch_one(executor)
        .await
    }

    /// Renames a column
    pub async fn rename<'e, E>(executor: E, id: Uuid, name: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE board_columns AS c
             SET name = $2, updated_at = NOW()
             WHERE c.id = $1
             RETURNING {COLUMN_FIELDS}"
        );

        sqlx::query_as::<_, Column>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(executor)
            .await
    }

    /// Sets a column's position
    pub async fn set_position<'e, E>(executor: E, id: Uuid, position: i32) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE board_columns SET position = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(position)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Shifts every sibling after `position` one slot left
    pub async fn close_gap<'e, E>(executor: E, board_id: Uuid, position: i32) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE board_columns SET position = position - 1
             WHERE board_id = $1 AND position > $2",
        )
        .bind(board_id)
        .bind(position)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Adds `delta` to the position of every sibling in `low..=high`
    ///
    /// Used to make room when a column moves to a new index.
    pub async fn shift_between<'e, E>(
        executor: E,
        board_id: Uuid,
        low: i32,
        high: i32,
        delta: i32,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE board_columns SET position = position + $4
             WHERE board_id = $1 AND position BETWEEN $2 AND $3",
        )
        .bind(board_id)
        .bind(low)
        .bind(high)
        .bind(delta)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes a column; its cards cascade
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM board_columns WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
