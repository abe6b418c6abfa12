//! Item operations

use sqlx::Row;

use crate::error::DbError;
use crate::models::{Item, NewItem};
use crate::repository::Database;

impl Database {
    // ==================== Item Operations ====================

    /// Insert a new item
    pub async fn insert_item(&self, item: NewItem) -> Result<Item, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO items (name, description)
            VALUES (?, ?)
            RETURNING id
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Item {
            id,
            name: item.name,
            description: item.description,
        })
    }

    /// Get an item by ID
    pub async fn get_item(&self, id: i64) -> Result<Option<Item>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, description
            FROM items
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Item::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List all items in insertion order
    pub async fn list_items(&self) -> Result<Vec<Item>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description
            FROM items
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Item::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Replace an item's fields, returning the stored row
    pub async fn update_item(&self, id: i64, item: NewItem) -> Result<Option<Item>, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE items
            SET name = ?, description = ?
            WHERE id = ?
            RETURNING id, name, description
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Item::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Delete an item
    pub async fn delete_item(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
