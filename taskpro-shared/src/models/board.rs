/// Board model and database operations
///
/// Boards are the top of the hierarchy and belong to exactly one user. A
/// board's columns are not stored on the board row; they are the rows of
/// `board_columns` whose `board_id` points here, ordered by `position`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(100) NOT NULL,
///     icon VARCHAR(255) NOT NULL DEFAULT '',
///     background VARCHAR(1024),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT boards_user_name_unique UNIQUE (user_id, name)
/// );
/// ```
///
/// All functions accept any Postgres executor so the hierarchy coordinator can
/// run them inside a transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

const BOARD_FIELDS: &str = "id, user_id, name, icon, background, created_at, updated_at";

/// Board owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    /// Unique board ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Name, unique per user
    pub name: String,

    /// Icon reference
    pub icon: String,

    /// Background reference (None = plain background)
    pub background: Option<String>,

    /// When the board was created
    pub created_at: DateTime<Utc>,

    /// When the board was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a board
#[derive(Debug, Clone)]
pub struct CreateBoard {
    /// Owning user
    pub user_id: Uuid,

    /// Board name
    pub name: String,

    /// Icon reference
    pub icon: String,

    /// Optional background reference
    pub background: Option<String>,
}

/// Partial board update
///
/// `background: Some(None)` clears the background.
#[derive(Debug, Clone, Default)]
pub struct UpdateBoard {
    /// New name
    pub name: Option<String>,

    /// New icon
    pub icon: Option<String>,

    /// New background (use Some(None) to clear)
    pub background: Option<Option<String>>,
}

impl Board {
    /// Inserts a board
    ///
    /// # Errors
    ///
    /// Unique violation on `boards_user_name_unique` when the user already has
    /// a board with this name.
    pub async fn create<'e, E>(executor: E, data: CreateBoard) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO boards (user_id, name, icon, background)
             VALUES ($1, $2, $3, $4)
             RETURNING {BOARD_FIELDS}"
        );

        sqlx::query_as::<_, Board>(&query)
            .bind(data.user_id)
            .bind(data.name)
            .bind(data.icon)
            .bind(data.background)
            .fetch_one(executor)
            .await
    }

    /// Finds a board if it belongs to `user_id`
    pub async fn find_for_user<'e, E>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {BOARD_FIELDS} FROM boards WHERE id = $1 AND user_id = $2");

        sqlx::query_as::<_, Board>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    /// Same as [`Board::find_for_user`] but takes a row lock
    ///
    /// Holding this lock serializes every change to the board's column set.
    pub async fn lock_for_user<'e, E>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {BOARD_FIELDS} FROM boards WHERE id = $1 AND user_id = $2 FOR UPDATE"
        );

        sqlx::query_as::<_, Board>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    /// Lists a user's boards, oldest first
    pub async fn list_by_user<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {BOARD_FIELDS} FROM boards WHERE user_id = $1 ORDER BY created_at, id"
        );

        sqlx::query_as::<_, Board>(&query)
            .bind(user_id)
            .fetch_all(executor)
            .await
    }

    /// Applies a partial update
    ///
    /// Returns None if the board doesn't exist.
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        data: UpdateBoard,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (set_background, background) = match data.background {
            Some(value) => (true, value),
            None => (false, None),
        };

        let query = format!(
            "UPDATE boards
             SET name = COALESCE($2, name),
                 icon = COALESCE($3, icon),
                 background = CASE WHEN $4 THEN $5 ELSE background END,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {BOARD_FIELDS}"
        );

        sqlx::query_as::<_, Board>(&query)
            .bind(id)
            .bind(data.name)
            .bind(data.icon)
            .bind(set_background)
            .bind(background)
            .fetch_optional(executor)
            .await
    }

    /// Deletes a board; its columns and their cards cascade
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_board_default_changes_nothing() {
        let update = UpdateBoard::default();
        assert!(update.name.is_none());
        assert!(update.icon.is_none());
        assert!(update.background.is_none());
    }

    #[test]
    fn test_board_serializes_camel_case() {
        let board = Board {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Work".to_string(),
            icon: "i1".to_string(),
            background: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&board).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json["background"].is_null());
        assert_eq!(json["name"], "Work");
    }
}
