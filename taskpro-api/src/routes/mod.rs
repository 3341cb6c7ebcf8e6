/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Signup, login, logout and email verification
/// - `users`: Current user profile
/// - `backgrounds`: Board background catalog
/// - `boards`, `columns`, `cards`: The kanban hierarchy

pub mod auth;
pub mod backgrounds;
pub mod boards;
pub mod cards;
pub mod columns;
pub mod health;
pub mod users;
