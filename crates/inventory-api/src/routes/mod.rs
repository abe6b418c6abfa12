//! API routes

mod auth;
mod health;
mod items;
pub mod types;

use axum::{Router, extract::DefaultBodyLimit};

use crate::state::AppState;

pub use auth::RequireAuth;

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .merge(health::routes())
        // Registration and token issuance
        .merge(auth::routes())
        // Item CRUD
        .merge(items::routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(64 * 1024))
}
