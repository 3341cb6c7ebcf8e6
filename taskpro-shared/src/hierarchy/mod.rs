/// Board → column → card hierarchy.
///
/// Membership is derived from the owner foreign keys, so a child can never be
/// listed under a parent it doesn't point at. What still needs coordinating is
/// ordering: every operation that changes a parent's set of children runs in
/// one transaction holding the parent's row lock, and leaves sibling positions
/// dense (0..n-1).
///
/// | Operation                | Lock held                         |
/// |--------------------------|-----------------------------------|
/// | add / remove / reorder column | board row                    |
/// | add / remove card        | column row                        |
/// | move card                | source and destination columns, in id order |
///
/// Every operation takes the caller's user id. Entities that exist but belong
/// to someone else are reported as `NotFound`.

mod boards;
mod cards;
mod columns;

use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::board::Board;
use crate::models::card::Card;
use crate::models::column::Column;

pub use boards::{BoardChanges, NewBoard};
pub use cards::{CardChanges, MovedCard, NewCard};
pub use columns::{ColumnChanges, NewColumn};

/// Column with its cards in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    #[serde(flatten)]
    pub column: Column,
    pub cards: Vec<Card>,
}

/// Board with its columns (and their cards) in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    #[serde(flatten)]
    pub board: Board,
    pub columns: Vec<ColumnView>,
}

/// Result of [`Hierarchy::integrity_report`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub boards: usize,
    pub columns: usize,
    pub cards: usize,
    /// One line per parent whose child positions aren't exactly 0..n-1
    pub issues: Vec<String>,
}

impl IntegrityReport {
    pub fn is_consistent(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Coordinator for all board, column and card changes
#[derive(Clone)]
pub struct Hierarchy {
    db: PgPool,
}

impl Hierarchy {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Recomputes sibling ordering for every board and column the user owns
    pub async fn integrity_report(&self, user_id: Uuid) -> CoreResult<IntegrityReport> {
        let boards = self.list_boards(user_id).await?;
        Ok(check_integrity(&boards))
    }

    /// Loads columns and cards for `boards` and nests them
    async fn hydrate(
        conn: &mut sqlx::PgConnection,
        boards: Vec<Board>,
    ) -> CoreResult<Vec<BoardView>> {
        let board_ids: Vec<Uuid> = boards.iter().map(|b| b.id).collect();
        let columns = Column::list_by_boards(&mut *conn, &board_ids).await?;

        let column_ids: Vec<Uuid> = columns.iter().map(|c| c.id).collect();
        let cards = Card::list_by_columns(&mut *conn, &column_ids).await?;

        Ok(assemble(boards, columns, cards))
    }
}

/// Nests flat rows; children keep the order they arrive in.
fn assemble(boards: Vec<Board>, columns: Vec<Column>, cards: Vec<Card>) -> Vec<BoardView> {
    let mut cards_by_column: HashMap<Uuid, Vec<Card>> = HashMap::new();
    for card in cards {
        cards_by_column.entry(card.column_id).or_default().push(card);
    }

    let mut columns_by_board: HashMap<Uuid, Vec<ColumnView>> = HashMap::new();
    for column in columns {
        let cards = cards_by_column.remove(&column.id).unwrap_or_default();
        columns_by_board
            .entry(column.board_id)
            .or_default()
            .push(ColumnView { column, cards });
    }

    boards
        .into_iter()
        .map(|board| {
            let columns = columns_by_board.remove(&board.id).unwrap_or_default();
            BoardView { board, columns }
        })
        .collect()
}

/// Positions must be exactly 0..n-1 in order.
fn position_issue(kind: &str, id: Uuid, positions: &[i32]) -> Option<String> {
    let dense = positions
        .iter()
        .enumerate()
        .all(|(index, position)| *position as usize == index);

    if dense {
        None
    } else {
        Some(format!("{} {} has child positions {:?}", kind, id, positions))
    }
}

fn check_integrity(boards: &[BoardView]) -> IntegrityReport {
    let mut report = IntegrityReport {
        boards: boards.len(),
        ..Default::default()
    };

    for view in boards {
        let positions: Vec<i32> = view.columns.iter().map(|c| c.column.position).collect();
        report.issues.extend(position_issue("board", view.board.id, &positions));

        for column in &view.columns {
            report.columns += 1;
            report.cards += column.cards.len();

            if column.column.board_id != view.board.id {
                report.issues.push(format!(
                    "column {} listed under board {} but owned by {}",
                    column.column.id, view.board.id, column.column.board_id
                ));
            }

            for card in &column.cards {
                if card.column_id != column.column.id {
                    report.issues.push(format!(
                        "card {} listed under column {} but owned by {}",
                        card.id, column.column.id, card.column_id
                    ));
                }
            }

            let positions: Vec<i32> = column.cards.iter().map(|k| k.position).collect();
            report.issues.extend(position_issue("column", column.column.id, &positions));
        }
    }

    report
}

/// Trims a required text field; blank is a validation error.
fn required_text(field: &str, value: &str) -> CoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation(format!("Missing required field {}", field)));
    }
    Ok(trimmed.to_string())
}

/// Rejects values longer than `max` characters.
fn bounded_text(field: &str, value: &str, max: usize) -> CoreResult<()> {
    if value.chars().count() > max {
        return Err(CoreError::validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

/// Same as [`required_text`] for optional updates.
fn optional_text(field: &str, value: Option<String>) -> CoreResult<Option<String>> {
    value.map(|v| required_text(field, &v)).transpose()
}

/// Clamps a requested index into `0..=max`.
fn clamp_position(requested: Option<i32>, max: i32) -> i32 {
    requested.map_or(max, |p| p.clamp(0, max.max(0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn board(id: Uuid) -> Board {
        Board {
            id,
            user_id: Uuid::new_v4(),
            name: format!("board-{}", id),
            icon: String::new(),
            background: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn column(board_id: Uuid, position: i32) -> Column {
        Column {
            id: Uuid::new_v4(),
            board_id,
            name: format!("col-{}", position),
            position,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn card(column_id: Uuid, position: i32) -> Card {
        Card {
            id: Uuid::new_v4(),
            column_id,
            title: format!("card-{}", position),
            description: None,
            label_color: None,
            deadline: None,
            position,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_assemble_nests_children_under_owners() {
        let (b1, b2) = (Uuid::new_v4(), Uuid::new_v4());
        let todo = column(b1, 0);
        let done = column(b1, 1);
        let cards = vec![card(todo.id, 0), card(todo.id, 1), card(done.id, 0)];

        let views = assemble(
            vec![board(b1), board(b2)],
            vec![todo.clone(), done.clone()],
            cards,
        );

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].columns.len(), 2);
        assert_eq!(views[0].columns[0].column.id, todo.id);
        assert_eq!(views[0].columns[0].cards.len(), 2);
        assert_eq!(views[0].columns[1].cards.len(), 1);
        assert!(views[1].columns.is_empty());
    }

    #[test]
    fn test_integrity_accepts_dense_positions() {
        let b = Uuid::new_v4();
        let c = column(b, 0);
        let views = assemble(vec![board(b)], vec![c.clone()], vec![card(c.id, 0), card(c.id, 1)]);

        let report = check_integrity(&views);
        assert!(report.is_consistent());
        assert_eq!((report.boards, report.columns, report.cards), (1, 1, 2));
    }

    #[test]
    fn test_integrity_reports_gaps_and_duplicates() {
        let b = Uuid::new_v4();
        let c = column(b, 0);
        let gap = column(b, 2);
        let views = assemble(
            vec![board(b)],
            vec![c.clone(), gap],
            vec![card(c.id, 0), card(c.id, 0)],
        );

        let report = check_integrity(&views);
        assert_eq!(report.issues.len(), 2);
        assert!(report.issues.iter().any(|i| i.starts_with("board")));
        assert!(report.issues.iter().any(|i| i.starts_with("column")));
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("name", "  Todo ").unwrap(), "Todo");
        assert!(matches!(required_text("name", "   "), Err(CoreError::Validation(_))));
        assert_eq!(optional_text("title", None).unwrap(), None);
        assert!(optional_text("title", Some(String::new())).is_err());
    }

    #[test]
    fn test_bounded_text_counts_characters() {
        assert!(bounded_text("background", &"x".repeat(1024), 1024).is_ok());
        assert!(matches!(
            bounded_text("background", &"x".repeat(1025), 1024),
            Err(CoreError::Validation(_))
        ));
        // Multi-byte characters count once
        assert!(bounded_text("icon", &"é".repeat(255), 255).is_ok());
    }

    #[test]
    fn test_clamp_position() {
        assert_eq!(clamp_position(None, 3), 3);
        assert_eq!(clamp_position(Some(-4), 3), 0);
        assert_eq!(clamp_position(Some(1), 3), 1);
        assert_eq!(clamp_position(Some(99), 3), 3);
        assert_eq!(clamp_position(Some(5), 0), 0);
    }

    #[test]
    fn test_board_view_serializes_flat() {
        let b = Uuid::new_v4();
        let view = BoardView {
            board: board(b),
            columns: vec![],
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], b.to_string());
        assert_eq!(json["columns"], serde_json::json!([]));
    }
}
