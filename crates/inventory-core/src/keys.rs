//! Cache key layout

/// Key holding the serialized list of all items
pub const COLLECTION_KEY: &str = "items";

/// Key holding a single serialized item
pub fn item_key(id: i64) -> String {
    format!("item_{}", id)
}
