//! Inventory Cache Store Layer
//!
//! This crate provides the key/value cache capability used by the
//! item controller: a TTL store trait with Redis and in-process
//! backends, plus wrappers that log traffic and absorb store failures.

pub mod error;
pub mod memory;
pub mod observed;
pub mod redis_store;
pub mod resilient;
pub mod store;

pub use error::CacheError;
pub use memory::MemoryStore;
pub use observed::ObservedStore;
pub use redis_store::RedisStore;
pub use resilient::ResilientCache;
pub use store::CacheStore;
