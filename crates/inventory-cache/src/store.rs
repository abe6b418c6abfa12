//! Cache store trait

use async_trait::async_trait;
use std::time::Duration;

use crate::error::CacheError;

/// Key/value store with per-entry time-to-live
///
/// Values are opaque serialized payloads. An expired entry must be
/// indistinguishable from one that was never written.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read the payload stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`, expiring after `ttl`
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Remove `key`; removing an absent key is not an error
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
