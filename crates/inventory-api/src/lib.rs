//! Inventory REST API
//!
//! This crate provides the Axum-based HTTP API for the inventory
//! service: item CRUD behind bearer authentication, plus user
//! registration and token issuance.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
