//! Redis cache store

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::info;

use crate::error::CacheError;
use crate::store::CacheStore;

/// Cache store backed by a Redis server
///
/// The connection is opened on first use rather than at construction so
/// that the service can start while Redis is down. A failed connect is
/// retried by the next operation.
pub struct RedisStore {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
}

impl RedisStore {
    /// Create a store for the given `redis://` URL
    pub fn new(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        info!("Using Redis cache store at {}", url);

        Ok(Self {
            client,
            conn: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let manager = self.client.get_connection_manager().await?;
                info!("Connected to Redis");
                Ok::<_, CacheError>(manager)
            })
            .await?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        // SETEX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, value, seconds).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}
