//! Logging decorator for cache stores

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::CacheError;
use crate::store::CacheStore;

/// Wraps a store and records every lookup, fill and invalidation
pub struct ObservedStore {
    inner: Arc<dyn CacheStore>,
}

impl ObservedStore {
    pub fn new(inner: Arc<dyn CacheStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl CacheStore for ObservedStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let result = self.inner.get(key).await;
        match &result {
            Ok(Some(_)) => debug!(key, "Cache hit"),
            Ok(None) => debug!(key, "Cache miss"),
            Err(_) => {}
        }
        result
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let result = self.inner.set(key, value, ttl).await;
        if result.is_ok() {
            debug!(key, ttl_secs = ttl.as_secs(), bytes = value.len(), "Cached payload");
        }
        result
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let result = self.inner.delete(key).await;
        if result.is_ok() {
            debug!(key, "Cache invalidated");
        }
        result
    }
}
