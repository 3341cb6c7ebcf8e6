use serde::Serialize;
use uuid::Uuid;

use super::{clamp_position, optional_text, required_text, Hierarchy};
use crate::error::{CoreError, CoreResult};
use crate::models::card::{Card, CreateCard, UpdateCard};
use crate::models::column::Column;

/// How many times a card operation re-reads a card that moved under it
const RELOCK_ATTEMPTS: usize = 3;

/// Card creation input
#[derive(Debug, Clone, Default)]
pub struct NewCard {
    pub title: String,
    pub description: Option<String>,
    pub label_color: Option<String>,
    pub deadline: Option<String>,
}

/// Partial card update
#[derive(Debug, Clone, Default)]
pub struct CardChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub label_color: Option<String>,
    pub deadline: Option<String>,
}

/// Outcome of a card move
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovedCard {
    pub card: Card,
    pub old_column_id: Uuid,
    pub new_column_id: Uuid,
}

fn card_not_found() -> CoreError {
    CoreError::not_found("Card not found")
}

fn column_not_found() -> CoreError {
    CoreError::not_found("Column not found")
}

impl Hierarchy {
    /// Appends a card to a column
    ///
    /// # Errors
    ///
    /// `Validation` for a blank title, `NotFound` if the column isn't the
    /// user's.
    pub async fn create_card(
        &self,
        user_id: Uuid,
        column_id: Uuid,
        input: NewCard,
    ) -> CoreResult<Card> {
        let title = required_text("title", &input.title)?;

        let mut tx = self.db.begin().await?;

        Column::lock_for_user(&mut *tx, &[column_id], user_id)
            .await?
            .pop()
            .ok_or_else(column_not_found)?;

        let position = Card::count_in_column(&mut *tx, column_id).await? as i32;
        let card = Card::create(
            &mut *tx,
            column_id,
            CreateCard {
                title,
                description: input.description,
                label_color: input.label_color,
                deadline: input.deadline,
            },
            position,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            column_id = %column_id,
            card_id = %card.id,
            position,
            "Card created"
        );
        Ok(card)
    }

    /// Applies the provided card fields
    pub async fn update_card(
        &self,
        user_id: Uuid,
        card_id: Uuid,
        changes: CardChanges,
    ) -> CoreResult<Card> {
        let title = optional_text("title", changes.title)?;

        Card::find_for_user(&self.db, card_id, user_id)
            .await?
            .ok_or_else(card_not_found)?;

        let card = Card::update(
            &self.db,
            card_id,
            UpdateCard {
                title,
                description: changes.description,
                label_color: changes.label_color,
                deadline: changes.deadline,
            },
        )
        .await?
        .ok_or_else(card_not_found)?;

        tracing::info!(user_id = %user_id, card_id = %card_id, "Card updated");
        Ok(card)
    }

    /// Deletes a card and closes the gap in its column
    pub async fn delete_card(&self, user_id: Uuid, card_id: Uuid) -> CoreResult<()> {
        let mut tx = self.db.begin().await?;
        let card = lock_card_columns(&mut tx, user_id, card_id, None).await?;

        Card::delete(&mut *tx, card.id).await?;
        Card::close_gap(&mut *tx, card.column_id, card.position).await?;

        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            column_id = %card.column_id,
            card_id = %card_id,
            "Card deleted"
        );
        Ok(())
    }

    /// Moves a card to `new_column_id` at `position` (default: the end)
    ///
    /// Removal from the source, insertion into the destination and the owner
    /// change commit together. Moving within the same column reorders it.
    ///
    /// # Errors
    ///
    /// `NotFound` if the card or the destination column isn't the user's.
    pub async fn move_card(
        &self,
        user_id: Uuid,
        card_id: Uuid,
        new_column_id: Uuid,
        position: Option<i32>,
    ) -> CoreResult<MovedCard> {
        let mut tx = self.db.begin().await?;
        let card = lock_card_columns(&mut tx, user_id, card_id, Some(new_column_id)).await?;

        let old_column_id = card.column_id;
        let current = card.position;

        let moved = if old_column_id == new_column_id {
            let last = Card::count_in_column(&mut *tx, old_column_id).await? as i32 - 1;
            let target = clamp_position(position, last);

            if target < current {
                Card::shift_between(&mut *tx, old_column_id, target, current - 1, 1).await?;
            } else if target > current {
                Card::shift_between(&mut *tx, old_column_id, current + 1, target, -1).await?;
            }
            Card::relocate(&mut *tx, card.id, old_column_id, target).await?
        } else {
            let end = Card::count_in_column(&mut *tx, new_column_id).await? as i32;
            let target = clamp_position(position, end);

            Card::close_gap(&mut *tx, old_column_id, current).await?;
            Card::open_gap(&mut *tx, new_column_id, target).await?;
            Card::relocate(&mut *tx, card.id, new_column_id, target).await?
        };

        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            card_id = %card_id,
            old_column_id = %old_column_id,
            new_column_id = %new_column_id,
            position = moved.position,
            "Card moved"
        );

        Ok(MovedCard {
            card: moved,
            old_column_id,
            new_column_id,
        })
    }
}

/// Locks the card's column (plus `extra`, if given) and re-reads the card
///
/// Column locks are taken in id order. If the card changed column between the
/// first read and the lock, the read is retried.
async fn lock_card_columns(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
    card_id: Uuid,
    extra: Option<Uuid>,
) -> CoreResult<Card> {
    for _ in 0..RELOCK_ATTEMPTS {
        let seen = Card::find_for_user(&mut **tx, card_id, user_id)
            .await?
            .ok_or_else(card_not_found)?;

        let mut ids = vec![seen.column_id];
        ids.extend(extra);
        ids.sort();
        ids.dedup();

        let locked = Column::lock_for_user(&mut **tx, &ids, user_id).await?;
        if locked.len() != ids.len() {
            return Err(column_not_found());
        }

        let card = Card::find_for_user(&mut **tx, card_id, user_id)
            .await?
            .ok_or_else(card_not_found)?;

        if card.column_id == seen.column_id {
            return Ok(card);
        }

        tracing::debug!(card_id = %card_id, "Card moved while locking, retrying");
    }

    Err(CoreError::Conflict(
        "Card is being moved by another request".to_string(),
    ))
}
