//! # TaskDeck Shared Library
//!
//! This crate contains the persistence layer and authentication primitives
//! used by the TaskDeck API server.
//!
//! ## Module Organization
//!
//! - `db`: SQLite connection pool and embedded migrations
//! - `models`: Users and tasks with their ownership-scoped queries
//! - `auth`: Password hashing, signed session tokens, request context

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the TaskDeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
