//! Item cache configuration

use std::time::Duration;

/// How long cached payloads live when nothing invalidates them
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Configuration for the item controller's caching
#[derive(Debug, Clone)]
pub struct ItemCacheConfig {
    /// Lifetime of every cache entry
    pub ttl: Duration,
    /// Also drop the per-item key when an item is updated.
    ///
    /// Off by default: updates only invalidate the collection key, so a
    /// cached single item may lag an update by up to one `ttl`.
    pub invalidate_item_on_update: bool,
}

impl Default for ItemCacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            invalidate_item_on_update: false,
        }
    }
}
