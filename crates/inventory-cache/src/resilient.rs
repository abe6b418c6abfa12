//! Failure-absorbing cache handle
//!
//! The cache is an optimisation, never a dependency: every store error or
//! timeout is logged here and turned into a miss (for reads) or a no-op
//! (for writes and deletes). Callers therefore see an infallible API.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

use crate::error::CacheError;
use crate::store::CacheStore;

/// Default bound on a single cache round trip
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_millis(250);

/// Cache handle that never fails
#[derive(Clone)]
pub struct ResilientCache {
    store: Arc<dyn CacheStore>,
    op_timeout: Duration,
}

impl ResilientCache {
    /// Wrap a store, bounding each operation by `op_timeout`
    pub fn new(store: Arc<dyn CacheStore>, op_timeout: Duration) -> Self {
        Self { store, op_timeout }
    }

    /// Read a payload; unavailability reads as a miss
    pub async fn get(&self, key: &str) -> Option<String> {
        self.guard("get", key, self.store.get(key)).await.flatten()
    }

    /// Store a payload; failures are dropped
    pub async fn set(&self, key: &str, value: &str, ttl: Duration) {
        self.guard("set", key, self.store.set(key, value, ttl)).await;
    }

    /// Remove a key; failures are dropped
    pub async fn delete(&self, key: &str) {
        self.guard("delete", key, self.store.delete(key)).await;
    }

    async fn guard<T>(
        &self,
        op: &'static str,
        key: &str,
        fut: impl Future<Output = Result<T, CacheError>>,
    ) -> Option<T> {
        match timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!(op, key, error = %e, "Cache store unavailable, continuing without cache");
                None
            }
            Err(_) => {
                warn!(
                    op,
                    key,
                    timeout_ms = self.op_timeout.as_millis() as u64,
                    "Cache store timed out, continuing without cache"
                );
                None
            }
        }
    }
}
