//! Item repository abstraction

use async_trait::async_trait;
use inventory_db::{Database, DbError, Item, NewItem};

/// Authoritative store of items
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// All items, ordered by id
    async fn list_items(&self) -> Result<Vec<Item>, DbError>;

    async fn get_item(&self, id: i64) -> Result<Option<Item>, DbError>;

    /// Persist a new item; the repository assigns its id
    async fn insert_item(&self, item: NewItem) -> Result<Item, DbError>;

    /// Replace an item's fields; `None` if the id does not exist
    async fn update_item(&self, id: i64, item: NewItem) -> Result<Option<Item>, DbError>;

    /// Remove an item; `false` if the id does not exist
    async fn delete_item(&self, id: i64) -> Result<bool, DbError>;
}

#[async_trait]
impl ItemRepository for Database {
    async fn list_items(&self) -> Result<Vec<Item>, DbError> {
        Database::list_items(self).await
    }

    async fn get_item(&self, id: i64) -> Result<Option<Item>, DbError> {
        Database::get_item(self, id).await
    }

    async fn insert_item(&self, item: NewItem) -> Result<Item, DbError> {
        Database::insert_item(self, item).await
    }

    async fn update_item(&self, id: i64, item: NewItem) -> Result<Option<Item>, DbError> {
        Database::update_item(self, id, item).await
    }

    async fn delete_item(&self, id: i64) -> Result<bool, DbError> {
        Database::delete_item(self, id).await
    }
}
