//! Cache-aside item controller
//!
//! Reads consult the cache first and fill it from the repository on a
//! miss. Writes commit to the repository first and only then drop the
//! affected cache keys, so a concurrent read can never re-cache a value
//! older than the committed write for longer than one TTL.

use inventory_cache::ResilientCache;
use inventory_db::Item;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::instrument;

use crate::config::ItemCacheConfig;
use crate::error::CoreError;
use crate::keys::{COLLECTION_KEY, item_key};
use crate::repository::ItemRepository;
use crate::validation::{ItemFields, validate_full, validate_partial};

/// Mediates between request handlers, the item repository and the cache
#[derive(Clone)]
pub struct ItemController {
    repo: Arc<dyn ItemRepository>,
    cache: ResilientCache,
    config: ItemCacheConfig,
}

impl ItemController {
    pub fn new(repo: Arc<dyn ItemRepository>, cache: ResilientCache, config: ItemCacheConfig) -> Self {
        Self { repo, cache, config }
    }

    /// All items, served from the collection key when present
    #[instrument(name = "list_items", skip_all)]
    pub async fn list_items(&self) -> Result<Vec<Item>, CoreError> {
        if let Some(items) = self.cached::<Vec<Item>>(COLLECTION_KEY).await {
            return Ok(items);
        }

        let items = self.repo.list_items().await?;
        self.populate(COLLECTION_KEY, &items).await;
        Ok(items)
    }

    /// A single item, served from its per-item key when present
    #[instrument(name = "get_item", skip(self))]
    pub async fn get_item(&self, id: i64) -> Result<Item, CoreError> {
        let key = item_key(id);
        if let Some(item) = self.cached::<Item>(&key).await {
            return Ok(item);
        }

        let item = self.repo.get_item(id).await?.ok_or_else(|| not_found(id))?;
        self.populate(&key, &item).await;
        Ok(item)
    }

    /// Validate and persist a new item
    #[instrument(name = "create_item", skip_all)]
    pub async fn create_item(&self, fields: &ItemFields) -> Result<Item, CoreError> {
        let new_item = validate_full(fields)?;
        let item = self.repo.insert_item(new_item).await?;

        self.cache.delete(COLLECTION_KEY).await;
        Ok(item)
    }

    /// Replace every field of an existing item
    #[instrument(name = "update_item", skip(self, fields))]
    pub async fn update_item(&self, id: i64, fields: &ItemFields) -> Result<Item, CoreError> {
        self.apply_update(id, fields, false).await
    }

    /// Change only the submitted fields of an existing item
    #[instrument(name = "patch_item", skip(self, fields))]
    pub async fn patch_item(&self, id: i64, fields: &ItemFields) -> Result<Item, CoreError> {
        self.apply_update(id, fields, true).await
    }

    /// Remove an item
    #[instrument(name = "delete_item", skip(self))]
    pub async fn delete_item(&self, id: i64) -> Result<(), CoreError> {
        if !self.repo.delete_item(id).await? {
            return Err(not_found(id));
        }

        self.cache.delete(COLLECTION_KEY).await;
        self.cache.delete(&item_key(id)).await;
        Ok(())
    }

    async fn apply_update(&self, id: i64, fields: &ItemFields, partial: bool) -> Result<Item, CoreError> {
        let current = self.repo.get_item(id).await?.ok_or_else(|| not_found(id))?;

        let changes = if partial {
            validate_partial(fields, &current)?
        } else {
            validate_full(fields)?
        };

        // The row can vanish between the read above and this write
        let item = self
            .repo
            .update_item(id, changes)
            .await?
            .ok_or_else(|| not_found(id))?;

        self.cache.delete(COLLECTION_KEY).await;
        if self.config.invalidate_item_on_update {
            self.cache.delete(&item_key(id)).await;
        }
        Ok(item)
    }

    /// Decode a cached payload; an undecodable payload counts as a miss
    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let payload = self.cache.get(key).await?;
        serde_json::from_str(&payload).ok()
    }

    async fn populate<T: Serialize>(&self, key: &str, value: &T) {
        if let Ok(payload) = serde_json::to_string(value) {
            self.cache.set(key, &payload, self.config.ttl).await;
        }
    }
}

fn not_found(id: i64) -> CoreError {
    CoreError::NotFound(format!("Item {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use inventory_cache::{CacheError, CacheStore, MemoryStore};
    use inventory_db::{Database, DbError, NewItem};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Repository wrapper counting calls that reach the database
    struct CountingRepo {
        db: Database,
        reads: AtomicUsize,
        writes: AtomicUsize,
    }

    impl CountingRepo {
        fn new(db: Database) -> Self {
            Self {
                db,
                reads: AtomicUsize::new(0),
                writes: AtomicUsize::new(0),
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ItemRepository for CountingRepo {
        async fn list_items(&self) -> Result<Vec<Item>, DbError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.db.list_items().await
        }

        async fn get_item(&self, id: i64) -> Result<Option<Item>, DbError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.db.get_item(id).await
        }

        async fn insert_item(&self, item: NewItem) -> Result<Item, DbError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.db.insert_item(item).await
        }

        async fn update_item(&self, id: i64, item: NewItem) -> Result<Option<Item>, DbError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.db.update_item(id, item).await
        }

        async fn delete_item(&self, id: i64) -> Result<bool, DbError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.db.delete_item(id).await
        }
    }

    struct DownStore;

    #[async_trait]
    impl CacheStore for DownStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Backend("down".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Backend("down".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Backend("down".to_string()))
        }
    }

    struct Fixture {
        controller: ItemController,
        repo: Arc<CountingRepo>,
        store: Arc<MemoryStore>,
    }

    async fn fixture_with(config: ItemCacheConfig) -> Fixture {
        let repo = Arc::new(CountingRepo::new(Database::in_memory().await.unwrap()));
        let store = Arc::new(MemoryStore::new());
        let cache = ResilientCache::new(store.clone(), Duration::from_millis(250));
        Fixture {
            controller: ItemController::new(repo.clone(), cache, config),
            repo,
            store,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(ItemCacheConfig::default()).await
    }

    async fn cached(store: &MemoryStore, key: &str) -> Option<String> {
        store.get(key).await.unwrap()
    }

    #[tokio::test]
    async fn test_list_is_served_from_cache_on_second_call() {
        let f = fixture().await;
        f.controller.create_item(&ItemFields::new("Widget", "A widget")).await.unwrap();

        let first = f.controller.list_items().await.unwrap();
        let reads_after_first = f.repo.reads();
        let second = f.controller.list_items().await.unwrap();

        assert_eq!(f.repo.reads(), reads_after_first);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(
            cached(&f.store, COLLECTION_KEY).await.unwrap(),
            serde_json::to_string(&first).unwrap()
        );
    }

    #[tokio::test]
    async fn test_create_invalidates_collection() {
        let f = fixture().await;
        assert!(f.controller.list_items().await.unwrap().is_empty());
        assert!(cached(&f.store, COLLECTION_KEY).await.is_some());

        let item = f.controller.create_item(&ItemFields::new("Widget", "A widget")).await.unwrap();
        assert!(cached(&f.store, COLLECTION_KEY).await.is_none());

        assert_eq!(f.controller.list_items().await.unwrap(), vec![item]);
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips_fields() {
        let f = fixture().await;
        let created = f.controller.create_item(&ItemFields::new("Widget", "A widget")).await.unwrap();

        let fetched = f.controller.get_item(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "Widget");
        assert_eq!(fetched.description, "A widget");
        assert!(cached(&f.store, &item_key(created.id)).await.is_some());

        // Second read is a hit
        let reads = f.repo.reads();
        f.controller.get_item(created.id).await.unwrap();
        assert_eq!(f.repo.reads(), reads);
    }

    #[tokio::test]
    async fn test_get_missing_item() {
        let f = fixture().await;
        let err = f.controller.get_item(99).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        assert!(cached(&f.store, &item_key(99)).await.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_fields() {
        let f = fixture().await;
        f.controller.list_items().await.unwrap();

        let fields: ItemFields = serde_json::from_value(json!({"description": "no name"})).unwrap();
        let err = f.controller.create_item(&fields).await.unwrap_err();

        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(f.repo.writes(), 0);
        assert!(cached(&f.store, COLLECTION_KEY).await.is_some());
    }

    #[tokio::test]
    async fn test_update_invalidates_collection_but_not_item_key() {
        let f = fixture().await;
        let item = f.controller.create_item(&ItemFields::new("Widget", "A widget")).await.unwrap();
        f.controller.list_items().await.unwrap();
        f.controller.get_item(item.id).await.unwrap();

        let updated = f
            .controller
            .update_item(item.id, &ItemFields::new("Gadget", "Renamed"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Gadget");

        assert!(cached(&f.store, COLLECTION_KEY).await.is_none());
        assert_eq!(f.controller.list_items().await.unwrap(), vec![updated]);

        // Per-item entry is left alone until its TTL runs out
        let stale = f.controller.get_item(item.id).await.unwrap();
        assert_eq!(stale.name, "Widget");
    }

    #[tokio::test]
    async fn test_update_can_invalidate_item_key() {
        let f = fixture_with(ItemCacheConfig {
            invalidate_item_on_update: true,
            ..ItemCacheConfig::default()
        })
        .await;
        let item = f.controller.create_item(&ItemFields::new("Widget", "A widget")).await.unwrap();
        f.controller.get_item(item.id).await.unwrap();

        f.controller
            .update_item(item.id, &ItemFields::new("Gadget", "Renamed"))
            .await
            .unwrap();

        assert!(cached(&f.store, &item_key(item.id)).await.is_none());
        assert_eq!(f.controller.get_item(item.id).await.unwrap().name, "Gadget");
    }

    #[tokio::test]
    async fn test_stale_item_expires_after_ttl() {
        let f = fixture_with(ItemCacheConfig {
            ttl: Duration::from_millis(50),
            ..ItemCacheConfig::default()
        })
        .await;
        let item = f.controller.create_item(&ItemFields::new("Widget", "A widget")).await.unwrap();
        f.controller.get_item(item.id).await.unwrap();

        f.controller
            .update_item(item.id, &ItemFields::new("Gadget", "Renamed"))
            .await
            .unwrap();
        assert_eq!(f.controller.get_item(item.id).await.unwrap().name, "Widget");
        let reads = f.repo.reads();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(f.controller.get_item(item.id).await.unwrap().name, "Gadget");
        assert!(f.repo.reads() > reads);
    }

    #[tokio::test]
    async fn test_oversized_ttl_still_caches() {
        let f = fixture_with(ItemCacheConfig {
            ttl: Duration::from_secs(u64::MAX),
            ..ItemCacheConfig::default()
        })
        .await;
        f.controller.create_item(&ItemFields::new("Widget", "A widget")).await.unwrap();

        let first = f.controller.list_items().await.unwrap();
        let reads = f.repo.reads();
        assert_eq!(f.controller.list_items().await.unwrap(), first);
        assert_eq!(f.repo.reads(), reads);
    }

    #[tokio::test]
    async fn test_update_missing_item_has_no_side_effects() {
        let f = fixture().await;
        f.controller.list_items().await.unwrap();
        let writes = f.repo.writes();

        let err = f
            .controller
            .update_item(42, &ItemFields::new("Gadget", "Renamed"))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::NotFound(_)));
        assert_eq!(f.repo.writes(), writes);
        assert!(cached(&f.store, COLLECTION_KEY).await.is_some());
    }

    #[tokio::test]
    async fn test_update_reports_not_found_before_validation() {
        let f = fixture().await;
        let err = f.controller.update_item(42, &ItemFields::default()).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_patch_changes_only_given_fields() {
        let f = fixture().await;
        let item = f.controller.create_item(&ItemFields::new("Widget", "A widget")).await.unwrap();

        let fields: ItemFields = serde_json::from_value(json!({"description": "Changed"})).unwrap();
        let patched = f.controller.patch_item(item.id, &fields).await.unwrap();

        assert_eq!(patched.name, "Widget");
        assert_eq!(patched.description, "Changed");
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let f = fixture().await;
        let item = f.controller.create_item(&ItemFields::new("Widget", "A widget")).await.unwrap();
        f.controller.get_item(item.id).await.unwrap();
        f.controller.list_items().await.unwrap();

        f.controller.delete_item(item.id).await.unwrap();

        assert!(cached(&f.store, COLLECTION_KEY).await.is_none());
        assert!(matches!(
            f.controller.get_item(item.id).await.unwrap_err(),
            CoreError::NotFound(_)
        ));
        assert!(f.controller.list_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_item() {
        let f = fixture().await;
        f.controller.list_items().await.unwrap();

        let err = f.controller.delete_item(7).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        assert!(cached(&f.store, COLLECTION_KEY).await.is_some());
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_refilled() {
        let f = fixture().await;
        let item = f.controller.create_item(&ItemFields::new("Widget", "A widget")).await.unwrap();
        f.store
            .set(COLLECTION_KEY, "not json", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(f.controller.list_items().await.unwrap(), vec![item]);
        assert_ne!(cached(&f.store, COLLECTION_KEY).await.as_deref(), Some("not json"));
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_all_listed() {
        let f = fixture().await;
        f.controller.list_items().await.unwrap();

        let a = f.controller.clone();
        let b = f.controller.clone();
        let (first, second) = tokio::join!(
            async move { a.create_item(&ItemFields::new("First", "")).await },
            async move { b.create_item(&ItemFields::new("Second", "")).await },
        );
        let (first, second) = (first.unwrap(), second.unwrap());

        let items = f.controller.list_items().await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.contains(&first));
        assert!(items.contains(&second));
    }

    #[tokio::test]
    async fn test_unavailable_cache_falls_back_to_repository() {
        let db = Database::in_memory().await.unwrap();
        let cache = ResilientCache::new(Arc::new(DownStore), Duration::from_millis(250));
        let controller = ItemController::new(Arc::new(db), cache, ItemCacheConfig::default());

        let item = controller.create_item(&ItemFields::new("Widget", "A widget")).await.unwrap();
        assert_eq!(controller.list_items().await.unwrap(), vec![item.clone()]);
        assert_eq!(controller.get_item(item.id).await.unwrap(), item);

        controller.delete_item(item.id).await.unwrap();
        assert!(matches!(
            controller.get_item(item.id).await.unwrap_err(),
            CoreError::NotFound(_)
        ));
    }
}
