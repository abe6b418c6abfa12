//! Inventory Database Layer
//!
//! This crate provides the persistent store for items and users,
//! using SQLite via sqlx.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::{Database, DatabaseOptions};

/// Re-export sqlx types for convenience
pub use sqlx::Error as SqlxError;
