use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::UserGoal;
use crate::remote::{GoalCreate, GoalPatch, RemoteApi};
use crate::store::{keys, CollectionStore, StoreError};
use crate::sync::{op_id, Action, NewSyncOperation, Resource, SyncQueue};

use super::RepoError;

/// Caller input for a goal, before sanitizing. Signed fields so junk input
/// can be clamped instead of rejected.
#[derive(Debug, Clone, Default)]
pub struct NewGoal {
    pub daily_calories_kcal: i64,
    pub protein_percent: i64,
    pub carbs_percent: i64,
    pub fat_percent: i64,
    pub water_ml: i64,
}

fn clamp_percent(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

fn clamp_u32(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

fn sanitize_new(new: NewGoal) -> UserGoal {
    UserGoal::new(
        clamp_u32(new.daily_calories_kcal),
        clamp_percent(new.protein_percent),
        clamp_percent(new.carbs_percent),
        clamp_percent(new.fat_percent),
        clamp_u32(new.water_ml),
    )
}

/// Local-first goal repository; same orchestration as products.
pub struct GoalRepository {
    store: CollectionStore,
    queue: Arc<SyncQueue>,
    api: Arc<dyn RemoteApi>,
    items: RwLock<Vec<UserGoal>>,
}

impl GoalRepository {
    pub fn new(store: CollectionStore, api: Arc<dyn RemoteApi>, queue: Arc<SyncQueue>) -> Self {
        Self {
            store,
            queue,
            api,
            items: RwLock::new(Vec::new()),
        }
    }

    pub async fn list(&self) -> Vec<UserGoal> {
        self.items.read().await.clone()
    }

    /// The most recently created goal, which the app treats as active.
    pub async fn active(&self) -> Option<UserGoal> {
        self.items
            .read()
            .await
            .iter()
            .max_by_key(|g| g.created_at)
            .cloned()
    }

    pub async fn refresh(&self) -> Result<Vec<UserGoal>, StoreError> {
        let local: Vec<UserGoal> = self.store.load(keys::GOALS).await;
        *self.items.write().await = local.clone();

        match self.api.list_goals().await {
            Ok(remote) => {
                *self.items.write().await = remote.clone();
                self.store.save(keys::GOALS, &remote).await?;
                Ok(remote)
            }
            Err(e) => {
                tracing::debug!("Goal refresh staying local: {}", e);
                Ok(local)
            }
        }
    }

    pub async fn create(&self, new: NewGoal) -> Result<UserGoal, RepoError> {
        let goal = sanitize_new(new);

        let snapshot = {
            let mut items = self.items.write().await;
            items.push(goal.clone());
            items.clone()
        };
        self.store.save(keys::GOALS, &snapshot).await?;

        self.queue
            .enqueue(NewSyncOperation {
                id: op_id(Resource::Goals, Action::Create, goal.id, None),
                resource: Resource::Goals,
                action: Action::Create,
                payload: serde_json::to_value(GoalCreate::from(&goal))?,
            })
            .await?;

        Ok(goal)
    }

    pub async fn update(&self, id: Uuid, patch: GoalPatch) -> Result<Option<UserGoal>, RepoError> {
        let (snapshot, updated) = {
            let mut goals = self.items.write().await;
            let Some(goal) = goals.iter_mut().find(|g| g.id == id) else {
                return Ok(None);
            };
            if let Some(v) = patch.daily_calories_kcal {
                goal.daily_calories_kcal = v;
            }
            if let Some(v) = patch.protein_percent {
                goal.protein_percent = v.min(100);
            }
            if let Some(v) = patch.carbs_percent {
                goal.carbs_percent = v.min(100);
            }
            if let Some(v) = patch.fat_percent {
                goal.fat_percent = v.min(100);
            }
            if let Some(v) = patch.water_ml {
                goal.water_ml = v;
            }
            goal.updated_at = Utc::now();
            let updated = goal.clone();
            (goals.clone(), updated)
        };
        self.store.save(keys::GOALS, &snapshot).await?;

        let mut payload = serde_json::to_value(&patch)?;
        payload["id"] = json!(id);
        self.queue
            .enqueue(NewSyncOperation {
                id: op_id(Resource::Goals, Action::Update, id, Some(updated.updated_at)),
                resource: Resource::Goals,
                action: Action::Update,
                payload,
            })
            .await?;

        Ok(Some(updated))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let snapshot = {
            let mut goals = self.items.write().await;
            let before = goals.len();
            goals.retain(|g| g.id != id);
            if goals.len() == before {
                return Ok(false);
            }
            goals.clone()
        };
        self.store.save(keys::GOALS, &snapshot).await?;

        self.queue
            .enqueue(NewSyncOperation {
                id: op_id(Resource::Goals, Action::Delete, id, None),
                resource: Resource::Goals,
                action: Action::Delete,
                payload: json!({ "id": id }),
            })
            .await?;

        Ok(true)
    }
}
