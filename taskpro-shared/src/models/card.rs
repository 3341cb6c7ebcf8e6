/// Card model and database operations
///
/// A card belongs to exactly one column through `cards.column_id` and keeps a
/// dense `position` among that column's cards. Moving a card is a single
/// `UPDATE` of `column_id` and `position`, so a card can never be in two
/// columns or in none.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE cards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     column_id UUID NOT NULL REFERENCES board_columns(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL CHECK (length(btrim(title)) > 0),
///     description TEXT,
///     label_color VARCHAR(32),
///     deadline VARCHAR(64),
///     position INTEGER NOT NULL CHECK (position >= 0),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

const CARD_FIELDS: &str = "k.id, k.column_id, k.title, k.description, k.label_color, k.deadline, \
                           k.position, k.created_at, k.updated_at";

/// Task card within a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Unique card ID
    pub id: Uuid,

    /// Owning column
    #[serde(rename = "owner")]
    pub column_id: Uuid,

    /// Title (never blank)
    pub title: String,

    /// Free-form description
    pub description: Option<String>,

    /// Label color tag, stored as given
    pub label_color: Option<String>,

    /// Date-like deadline string, stored as given
    pub deadline: Option<String>,

    /// Zero-based index among the column's cards
    pub position: i32,

    /// When the card was created
    pub created_at: DateTime<Utc>,

    /// When the card was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a card
#[derive(Debug, Clone)]
pub struct CreateCard {
    /// Title
    pub title: String,

    /// Description
    pub description: Option<String>,

    /// Label color
    pub label_color: Option<String>,

    /// Deadline
    pub deadline: Option<String>,
}

/// Partial card update; only `Some` fields are written
#[derive(Debug, Clone, Default)]
pub struct UpdateCard {
    pub title: Option<String>,
    pub description: Option<String>,
    pub label_color: Option<String>,
    pub deadline: Option<String>,
}

impl Card {
    /// Inserts a card into `column_id` at `position`
    pub async fn create<'e, E>(
        executor: E,
        column_id: Uuid,
        data: CreateCard,
        position: i32,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO cards AS k (column_id, title, description, label_color, deadline, position)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {CARD_FIELDS}"
        );

        sqlx::query_as::<_, Card>(&query)
            .bind(column_id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.label_color)
            .bind(data.deadline)
            .bind(position)
            .fetch_one(executor)
            .await
    }

    /// Finds a card if the board it sits on belongs to `user_id`
    pub async fn find_for_user<'e, E>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {CARD_FIELDS}
             FROM cards k
             JOIN board_columns c ON c.id = k.column_id
             JOIN boards b ON b.id = c.board_id
             WHERE k.id = $1 AND b.user_id = $2"
        );

        sqlx::query_as::<_, Card>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    /// Lists the cards of several columns, grouped by column and ordered by position
    pub async fn list_by_columns<'e, E>(
        executor: E,
        column_ids: &[Uuid],
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {CARD_FIELDS}
             FROM cards k
             WHERE k.column_id = ANY($1)
             ORDER BY k.column_id, k.position"
        );

        sqlx::query_as::<_, Card>(&query)
            .bind(column_ids)
            .fetch_all(executor)
            .await
    }

    /// Number of cards in a column
    pub async fn count_in_column<'e, E>(executor: E, column_id: Uuid) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cards WHERE column_id = $1")
            .bind(column_id)
            .fetch_one(executor)
            .await
    }

    /// Applies a partial update
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        data: UpdateCard,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE cards AS k
             SET title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 label_color = COALESCE($4, label_color),
                 deadline = COALESCE($5, deadline),
                 updated_at = NOW()
             WHERE k.id = $1
             RETURNING {CARD_FIELDS}"
        );

        sqlx::query_as::<_, Card>(&query)
            .bind(id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.label_color)
            .bind(data.deadline)
            .fetch_optional(executor)
            .await
    }

    /// Re-homes a card: sets its owning column and position in one statement
    pub async fn relocate<'e, E>(
        executor: E,
        id: Uuid,
        column_id: Uuid,
        position: i32,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE cards AS k
             SET column_id = $2, position = $3, updated_at = NOW()
             WHERE k.id = $1
             RETURNING {CARD_FIELDS}"
        );

        sqlx::query_as::<_, Card>(&query)
            .bind(id)
            .bind(column_id)
            .bind(position)
            .fetch_one(executor)
            .await
    }

    /// Shifts every card after `position` in the column one slot left
    pub async fn close_gap<'e, E>(executor: E, column_id: Uuid, position: i32) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE cards SET position = position - 1
             WHERE column_id = $1 AND position > $2",
        )
        .bind(column_id)
        .bind(position)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Shifts every card at or after `position` in the column one slot right
    pub async fn open_gap<'e, E>(executor: E, column_id: Uuid, position: i32) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE cards SET position = position + 1
             WHERE column_id = $1 AND position >= $2",
        )
        .bind(column_id)
        .bind(position)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Adds `delta` to the position of every card in the column within `low..=high`
    pub async fn shift_between<'e, E>(
        executor: E,
        column_id: Uuid,
        low: i32,
        high: i32,
        delta: i32,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE cards SET position = position + $4
             WHERE column_id = $1 AND position BETWEEN $2 AND $3",
        )
        .bind(column_id)
        .bind(low)
        .bind(high)
        .bind(delta)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes a card
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
