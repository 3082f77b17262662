use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::kv::{KeyValueStore, StoreError};

/// Namespaced, versioned keys for persisted collections and sync bookkeeping.
pub mod keys {
    pub const PRODUCTS: &str = "countonme/products/v2";
    pub const PRODUCTS_V1: &str = "countonme/products/v1";
    pub const MEALS: &str = "countonme/meals/v2";
    pub const MEALS_V1: &str = "countonme/meals/v1";
    pub const GOALS: &str = "countonme/goals/v1";
    pub const BODY_WEIGHTS: &str = "countonme/body-weights/v1";
    pub const SYNC_QUEUE: &str = "countonme/sync-queue/v1";
    pub const LAST_SYNC_AT: &str = "countonme/sync/last-sync-at";
    pub const LAST_SYNC_ERROR: &str = "countonme/sync/last-sync-error";
    pub const DEVICE: &str = "countonme/device/v1";
}

/// Typed JSON-collection adapter over a [`KeyValueStore`].
///
/// Loads are tolerant: a missing key, malformed JSON, or a non-array value
/// all come back as an empty collection. Saves serialize the full collection
/// and propagate write failures.
#[derive(Clone)]
pub struct CollectionStore {
    kv: Arc<dyn KeyValueStore>,
    migrated: Arc<Mutex<HashSet<String>>>,
}

impl CollectionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            migrated: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// The underlying key-value store, for scalar bookkeeping keys.
    pub fn kv(&self) -> &Arc<dyn KeyValueStore> {
        &self.kv
    }

    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(raw) = self.kv.get(key).await else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("Discarding unreadable collection at '{}': {}", key, e);
                Vec::new()
            }
        }
    }

    pub async fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(items).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.kv.set(key, &raw).await
    }

    /// Marks a collection's migration as done for this process.
    ///
    /// Returns false if it had already run, so migration happens at most once
    /// per cold start per collection.
    pub(crate) fn begin_migration(&self, key: &str) -> bool {
        self.migrated.lock().unwrap().insert(key.to_string())
    }
}
