//! # TaskPro Shared Library
//!
//! Domain logic for the TaskPro kanban service, used by the API server.
//!
//! ## Module Organization
//!
//! - `error`: error taxonomy shared by every core operation
//! - `db`: connection pool and embedded migrations
//! - `models`: database rows and their queries
//! - `auth`: password hashing, session tokens and revocation
//! - `redis`: Redis client
//! - `mail`: verification mail delivery
//! - `assets`: image upload storage
//! - `identity`: signup, verification, login/logout, profile
//! - `hierarchy`: boards, columns and cards

pub mod assets;
pub mod auth;
pub mod db;
pub mod error;
pub mod hierarchy;
pub mod identity;
pub mod mail;
pub mod models;
pub mod redis;

/// Current version of the TaskPro shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
