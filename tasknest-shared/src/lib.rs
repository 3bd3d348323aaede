//! # TaskNest Shared Library
//!
//! This crate contains the data layer shared by the TaskNest API server:
//! database models, the connection pool, migrations, seeding, and password
//! hashing.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `db`: Connection pool, migration runner, and seed bootstrap
//! - `auth`: Password hashing (argon2)

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the TaskNest shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
