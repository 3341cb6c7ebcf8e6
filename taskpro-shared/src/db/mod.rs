/// Database layer for TaskPro
///
/// - `pool`: PostgreSQL connection pool with health checks and graceful close
/// - `migrations`: embedded schema migrations (users, boards, columns, cards, backgrounds)
///
/// Models live in the `models` module at crate root level.

pub mod migrations;
pub mod pool;
