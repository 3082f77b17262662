use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Product;
use crate::remote::{ProductCreate, RemoteApi};
use crate::store::{keys, migrate, CollectionStore, StoreError};
use crate::sync::{op_id, Action, NewSyncOperation, Resource, SyncQueue};

use super::{clamp_non_negative, sanitize_name, RepoError};

/// Caller input for a new product, before sanitizing.
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Local-first product repository.
///
/// The in-memory vec doubles as the published state and as a mirror for
/// reads inside concurrent async callbacks; every mutation rewrites the
/// whole persisted collection (last writer wins at collection granularity).
pub struct ProductRepository {
    store: CollectionStore,
    api: Arc<dyn RemoteApi>,
    queue: Arc<SyncQueue>,
    items: RwLock<Vec<Product>>,
}

fn sanitize_new(new: NewProduct) -> Product {
    Product::new(sanitize_name(&new.name, "Untitled product")).with_nutrition(
        clamp_non_negative(new.calories),
        clamp_non_negative(new.protein),
        clamp_non_negative(new.carbs),
        clamp_non_negative(new.fat),
    )
}

impl ProductRepository {
    pub fn new(store: CollectionStore, api: Arc<dyn RemoteApi>, queue: Arc<SyncQueue>) -> Self {
        Self {
            store,
            api,
            queue,
            items: RwLock::new(Vec::new()),
        }
    }

    /// Currently published products.
    pub async fn list(&self) -> Vec<Product> {
        self.items.read().await.clone()
    }

    /// Publishes the local collection, then reconciles with the server.
    ///
    /// A remote failure is expected when offline and stays silent; on
    /// success the remote list replaces the local cache entirely.
    pub async fn refresh(&self) -> Result<Vec<Product>, StoreError> {
        let local = migrate::load_products(&self.store).await;
        *self.items.write().await = local.clone();

        match self.api.list_products().await {
            Ok(remote) => {
                *self.items.write().await = remote.clone();
                self.store.save(keys::PRODUCTS, &remote).await?;
                Ok(remote)
            }
            Err(e) => {
                tracing::debug!("Product refresh staying local: {}", e);
                Ok(local)
            }
        }
    }

    pub async fn create(&self, new: NewProduct) -> Result<Product, RepoError> {
        let product = sanitize_new(new);

        let snapshot = {
            let mut items = self.items.write().await;
            items.push(product.clone());
            items.clone()
        };
        self.store.save(keys::PRODUCTS, &snapshot).await?;

        self.queue
            .enqueue(NewSyncOperation {
                id: op_id(Resource::Products, Action::Create, product.id, None),
                resource: Resource::Products,
                action: Action::Create,
                payload: serde_json::to_value(ProductCreate::from(&product))?,
            })
            .await?;

        Ok(product)
    }

    /// Renames a product. Returns `None` when the id is unknown: no
    /// persistence, no enqueue.
    pub async fn rename(&self, id: Uuid, name: &str) -> Result<Option<Product>, RepoError> {
        let name = sanitize_name(name, "Untitled product");

        let (snapshot, updated) = {
            let mut items = self.items.write().await;
            let Some(product) = items.iter_mut().find(|p| p.id == id) else {
                return Ok(None);
            };
            product.name = name.clone();
            product.updated_at = Utc::now();
            let updated = product.clone();
            (items.clone(), updated)
        };
        self.store.save(keys::PRODUCTS, &snapshot).await?;

        self.queue
            .enqueue(NewSyncOperation {
                id: op_id(
                    Resource::Products,
                    Action::Update,
                    id,
                    Some(updated.updated_at),
                ),
                resource: Resource::Products,
                action: Action::Update,
                payload: json!({ "id": id, "name": name }),
            })
            .await?;

        Ok(Some(updated))
    }

    /// Deletes a product. Returns false when the id is unknown.
    pub async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let snapshot = {
            let mut items = self.items.write().await;
            let before = items.len();
            items.retain(|p| p.id != id);
            if items.len() == before {
                return Ok(false);
            }
            items.clone()
        };
        self.store.save(keys::PRODUCTS, &snapshot).await?;

        self.queue
            .enqueue(NewSyncOperation {
                id: op_id(Resource::Products, Action::Delete, id, None),
                resource: Resource::Products,
                action: Action::Delete,
                payload: json!({ "id": id }),
            })
            .await?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::mock::MockApi;
    use crate::store::{KeyValueStore, MemoryStore};
    use crate::sync::NetworkMonitor;

    struct Fixture {
        kv: Arc<MemoryStore>,
        api: Arc<MockApi>,
        queue: Arc<SyncQueue>,
        repo: ProductRepository,
    }

    fn fixture() -> Fixture {
        let kv = Arc::new(MemoryStore::new());
        let api = Arc::new(MockApi::new());
        let store = CollectionStore::new(kv.clone() as Arc<dyn KeyValueStore>);
        let monitor = Arc::new(NetworkMonitor::new(true));
        let queue = Arc::new(SyncQueue::new(store.clone(), api.clone(), monitor));
        let repo = ProductRepository::new(store, api.clone(), queue.clone());
        Fixture {
            kv,
            api,
            queue,
            repo,
        }
    }

    #[tokio::test]
    async fn test_create_publishes_persists_enqueues() {
        let f = fixture();
        let product = f
            .repo
            .create(NewProduct {
                name: "  Oats ".into(),
                calories: 389.0,
                protein: -5.0,
                ..NewProduct::default()
            })
            .await
            .unwrap();

        assert_eq!(product.name, "Oats");
        assert_eq!(product.protein, 0.0);
        assert_eq!(f.repo.list().await, vec![product.clone()]);

        let persisted: Vec<Product> = f.repo.store.load(keys::PRODUCTS).await;
        assert_eq!(persisted, vec![product.clone()]);

        let ops = f.queue.queue().await;
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].id, format!("products.create:{}", product.id));
        assert_eq!(ops[0].payload["name"], "Oats");
    }

    #[tokio::test]
    async fn test_rename_payload_is_minimal_delta() {
        let f = fixture();
        let product = f
            .repo
            .create(NewProduct {
                name: "Oats".into(),
                ..NewProduct::default()
            })
            .await
            .unwrap();

        let renamed = f.repo.rename(product.id, "Rolled oats").await.unwrap();
        assert_eq!(renamed.unwrap().name, "Rolled oats");

        let ops = f.queue.queue().await;
        let payload = &ops[1].payload;
        assert_eq!(
            payload.as_object().unwrap().keys().collect::<Vec<_>>(),
            vec!["id", "name"]
        );
    }

    #[tokio::test]
    async fn test_rename_unknown_id_is_noop() {
        let f = fixture();
        let result = f.repo.rename(Uuid::new_v4(), "Ghost").await.unwrap();
        assert!(result.is_none());
        assert!(f.queue.queue().await.is_empty());
        let persisted: Vec<Product> = f.repo.store.load(keys::PRODUCTS).await;
        assert!(persisted.is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_noop() {
        let f = fixture();
        assert!(!f.repo.delete(Uuid::new_v4()).await.unwrap());
        assert!(f.queue.queue().await.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_remote_wins() {
        let f = fixture();
        // Local cache holds X, the server holds Y.
        let local = Product::new("Local only");
        f.repo.store.save(keys::PRODUCTS, &[local]).await.unwrap();
        let remote = Product::new("Remote truth");
        f.api.products.lock().unwrap().push(remote.clone());

        let published = f.repo.refresh().await.unwrap();
        assert_eq!(published, vec![remote.clone()]);
        assert_eq!(f.repo.list().await, vec![remote.clone()]);

        let persisted: Vec<Product> = f.repo.store.load(keys::PRODUCTS).await;
        assert_eq!(persisted, vec![remote]);
    }

    #[tokio::test]
    async fn test_refresh_remote_failure_keeps_local_silently() {
        let f = fixture();
        let local = Product::new("Local only");
        f.repo
            .store
            .save(keys::PRODUCTS, std::slice::from_ref(&local))
            .await
            .unwrap();
        f.api
            .set_error(Some(crate::remote::ApiError::Network("offline".into())));

        let published = f.repo.refresh().await.unwrap();
        assert_eq!(published, vec![local.clone()]);
        assert_eq!(f.repo.list().await, vec![local]);
    }

    #[tokio::test]
    async fn test_create_persist_failure_propagates_without_enqueue() {
        let f = fixture();
        f.kv.fail_writes(true);

        let result = f
            .repo
            .create(NewProduct {
                name: "Oats".into(),
                ..NewProduct::default()
            })
            .await;
        assert!(result.is_err());

        // In-memory state was published, but nothing reached the queue.
        assert_eq!(f.repo.list().await.len(), 1);
        f.kv.fail_writes(false);
        assert!(f.queue.queue().await.is_empty());
    }
}
