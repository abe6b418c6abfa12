//! Application state

use inventory_auth::JwtManager;
use inventory_core::ItemController;
use inventory_db::Database;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub items: ItemController,
    pub db: Database,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(items: ItemController, db: Database, jwt: Arc<JwtManager>) -> Self {
        Self { items, db, jwt }
    }
}
