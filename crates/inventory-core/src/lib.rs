//! Inventory Core Business Logic
//!
//! This crate provides the item controller, which layers cache-aside
//! reads and write invalidation over the item repository.

pub mod config;
pub mod controller;
pub mod error;
pub mod keys;
pub mod repository;
pub mod validation;

pub use config::ItemCacheConfig;
pub use controller::ItemController;
pub use error::CoreError;
pub use repository::ItemRepository;
pub use validation::{ItemFields, ValidationErrors};
