use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Meal, MealItem};
use crate::remote::{MealCreate, MealPatch, RemoteApi};
use crate::store::{keys, migrate, CollectionStore, StoreError};
use crate::sync::{op_id, Action, NewSyncOperation, Resource, SyncQueue};

use super::{sanitize_name, RepoError};

#[derive(Debug, Clone, Default)]
pub struct NewMeal {
    pub name: String,
    pub items: Vec<MealItem>,
}

/// Drops items with non-positive quantities; a meal line of zero grams
/// carries no information and the server rejects it.
fn sanitize_items(items: Vec<MealItem>) -> Vec<MealItem> {
    items
        .into_iter()
        .filter(|i| i.amount.is_finite() && i.amount > 0.0)
        .collect()
}

/// Local-first meal repository; same orchestration as products.
pub struct MealRepository {
    store: CollectionStore,
    queue: Arc<SyncQueue>,
    api: Arc<dyn RemoteApi>,
    items: RwLock<Vec<Meal>>,
}

impl MealRepository {
    pub fn new(store: CollectionStore, api: Arc<dyn RemoteApi>, queue: Arc<SyncQueue>) -> Self {
        Self {
            store,
            queue,
            api,
            items: RwLock::new(Vec::new()),
        }
    }

    pub async fn list(&self) -> Vec<Meal> {
        self.items.read().await.clone()
    }

    pub async fn refresh(&self) -> Result<Vec<Meal>, StoreError> {
        let local = migrate::load_meals(&self.store).await;
        *self.items.write().await = local.clone();

        match self.api.list_meals().await {
            Ok(remote) => {
                *self.items.write().await = remote.clone();
                self.store.save(keys::MEALS, &remote).await?;
                Ok(remote)
            }
            Err(e) => {
                tracing::debug!("Meal refresh staying local: {}", e);
                Ok(local)
            }
        }
    }

    pub async fn create(&self, new: NewMeal) -> Result<Meal, RepoError> {
        let meal =
            Meal::new(sanitize_name(&new.name, "Untitled meal")).with_items(sanitize_items(new.items));

        let snapshot = {
            let mut items = self.items.write().await;
            items.push(meal.clone());
            items.clone()
        };
        self.store.save(keys::MEALS, &snapshot).await?;

        self.queue
            .enqueue(NewSyncOperation {
                id: op_id(Resource::Meals, Action::Create, meal.id, None),
                resource: Resource::Meals,
                action: Action::Create,
                payload: serde_json::to_value(MealCreate::from(&meal))?,
            })
            .await?;

        Ok(meal)
    }

    /// Applies a partial update. `None` fields leave the meal untouched.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        items: Option<Vec<MealItem>>,
    ) -> Result<Option<Meal>, RepoError> {
        let patch = MealPatch {
            name: name.map(|n| sanitize_name(n, "Untitled meal")),
            items: items.map(sanitize_items),
        };

        let (snapshot, updated) = {
            let mut meals = self.items.write().await;
            let Some(meal) = meals.iter_mut().find(|m| m.id == id) else {
                return Ok(None);
            };
            if let Some(name) = &patch.name {
                meal.name = name.clone();
            }
            if let Some(items) = &patch.items {
                meal.items = items.clone();
            }
            meal.updated_at = Utc::now();
            let updated = meal.clone();
            (meals.clone(), updated)
        };
        self.store.save(keys::MEALS, &snapshot).await?;

        let mut payload = serde_json::to_value(&patch)?;
        payload["id"] = json!(id);
        self.queue
            .enqueue(NewSyncOperation {
                id: op_id(Resource::Meals, Action::Update, id, Some(updated.updated_at)),
                resource: Resource::Meals,
                action: Action::Update,
                payload,
            })
            .await?;

        Ok(Some(updated))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let snapshot = {
            let mut meals = self.items.write().await;
            let before = meals.len();
            meals.retain(|m| m.id != id);
            if meals.len() == before {
                return Ok(false);
            }
            meals.clone()
        };
        self.store.save(keys::MEALS, &snapshot).await?;

        self.queue
            .enqueue(NewSyncOperation {
                id: op_id(Resource::Meals, Action::Delete, id, None),
                resource: Resource::Meals,
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
    use crate::models::Unit;
    use crate::remote::mock::MockApi;
    use crate::store::{KeyValueStore, MemoryStore};
    use crate::sync::NetworkMonitor;

    struct Fixture {
        kv: Arc<MemoryStore>,
        api: Arc<MockApi>,
        queue: Arc<SyncQueue>,
        repo: MealRepository,
    }

    fn fixture() -> Fixture {
        let kv = Arc::new(MemoryStore::new());
        let api = Arc::new(MockApi::new());
        let store = CollectionStore::new(kv.clone() as Arc<dyn KeyValueStore>);
        let monitor = Arc::new(NetworkMonitor::new(true));
        let queue = Arc::new(SyncQueue::new(store.clone(), api.clone(), monitor));
        let repo = MealRepository::new(store, api.clone(), queue.clone());
        Fixture {
            kv,
            api,
            queue,
            repo,
        }
    }

    #[tokio::test]
    async fn test_create_drops_non_positive_items() {
        let f = fixture();
        let keep = MealItem::new(Uuid::new_v4(), 60.0, Unit::G);
        let meal = f
            .repo
            .create(NewMeal {
                name: "Porridge".into(),
                items: vec![
                    keep.clone(),
                    MealItem::new(Uuid::new_v4(), 0.0, Unit::G),
                    MealItem::new(Uuid::new_v4(), -3.0, Unit::Ml),
                ],
            })
            .await
            .unwrap();

        assert_eq!(meal.items, vec![keep]);
        assert_eq!(f.queue.queue().await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_name_only_sends_partial_payload() {
        let f = fixture();
        let meal = f
            .repo
            .create(NewMeal {
                name: "Porridge".into(),
                items: vec![MealItem::new(Uuid::new_v4(), 60.0, Unit::G)],
            })
            .await
            .unwrap();

        let updated = f
            .repo
            .update(meal.id, Some("Oat porridge"), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Oat porridge");
        assert_eq!(updated.items, meal.items);

        let ops = f.queue.queue().await;
        let payload = ops[1].payload.as_object().unwrap();
        assert!(payload.contains_key("id"));
        assert!(payload.contains_key("name"));
        assert!(!payload.contains_key("items"));
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_noop() {
        let f = fixture();
        let result = f.repo.update(Uuid::new_v4(), Some("x"), None).await.unwrap();
        assert!(result.is_none());
        assert!(f.queue.queue().await.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_migrates_v1_meals() {
        let f = fixture();
        let json = format!(
            r#"[{{
                "id": "{}",
                "name": "Old meal",
                "items": [{{"product_id": "{}", "grams": 40}}],
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z"
            }}]"#,
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        f.kv.set(keys::MEALS_V1, &json).await.unwrap();
        f.api
            .set_error(Some(crate::remote::ApiError::Network("offline".into())));

        let meals = f.repo.refresh().await.unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].items[0].amount, 40.0);
        assert_eq!(meals[0].items[0].unit, Unit::G);
    }

    #[tokio::test]
    async fn test_delete_then_queue_order() {
        let f = fixture();
        let meal = f
            .repo
            .create(NewMeal {
                name: "Porridge".into(),
                items: vec![MealItem::new(Uuid::new_v4(), 60.0, Unit::G)],
            })
            .await
            .unwrap();
        assert!(f.repo.delete(meal.id).await.unwrap());
        assert!(f.repo.list().await.is_empty());

        let ops = f.queue.queue().await;
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].action, Action::Create);
        assert_eq!(ops[1].action, Action::Delete);
        assert_eq!(ops[1].id, format!("meals.delete:{}", meal.id));
    }
}
