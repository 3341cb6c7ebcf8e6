/// Database models for TaskPro
///
/// Row types and their queries. Ownership checks that span tables
/// (`find_for_user`, `lock_for_user`) join up to `boards.user_id`.
///
/// # Models
///
/// - `user`: accounts, credentials and email verification state
/// - `board`: per-user boards
/// - `column`: ordered columns of a board
/// - `card`: ordered cards of a column
/// - `background`: read-only background image catalog
///
/// # Example
///
/// ```no_run
/// use taskpro_shared::models::board::{Board, CreateBoard};
/// use taskpro_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let board = Board::create(&pool, CreateBoard {
///     user_id,
///     name: "Work".to_string(),
///     icon: "i1".to_string(),
///     background: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod background;
pub mod board;
pub mod card;
pub mod column;
pub mod user;
