//! # Recipebox Shared Library
//!
//! This crate contains the data layer and authentication primitives used by
//! the Recipebox API server.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and migrations
//! - `models`: Database models (users, tokens, tags, ingredients, recipes)
//! - `auth`: Password hashing, token generation and request authentication
//! - `filters`: Query-string id list parsing
//! - `storage`: Media storage for uploaded recipe images

pub mod auth;
pub mod db;
pub mod filters;
pub mod models;
pub mod storage;

/// Current version of the Recipebox shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
