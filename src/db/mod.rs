//! Database layer
//!
//! This module provides database abstraction for the gallery.
//! It supports:
//! - SQLite (default, for single-binary deployment)
//! - MySQL (for larger deployments)
//!
//! The database driver is selected based on configuration.
//!
//! # Architecture
//!
//! The database layer uses a trait-based abstraction (`DatabasePool`) that
//! allows the application to work with either SQLite or MySQL without
//! knowing the specific backend. Repositories dispatch on [`Backend`]; when
//! the SQL text is identical for both drivers they use [`with_backend!`] so
//! the query is written once and compiled against each pool type.
//!
//! # Usage
//!
//! ```ignore
//! use gallery::config::DatabaseConfig;
//! use gallery::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

/// Run the same query body against whichever concrete pool `$pool` wraps.
///
/// The body is expanded once per driver, so it must only use SQL that both
/// SQLite and MySQL accept.
macro_rules! with_backend {
    ($pool:expr, |$conn:ident| $body:expr) => {
        match $pool.backend() {
            $crate::db::Backend::Sqlite($conn) => $body,
            $crate::db::Backend::Mysql($conn) => $body,
        }
    };
}

pub(crate) use with_backend;

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, Backend, DatabasePool, DynDatabasePool, MysqlDatabase,
    SqliteDatabase,
};
