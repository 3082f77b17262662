use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::json;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::BodyWeightEntry;
use crate::remote::{BodyWeightCreate, BodyWeightPatch, RemoteApi};
use crate::store::{keys, CollectionStore, StoreError};
use crate::sync::{op_id, Action, NewSyncOperation, Resource, SyncQueue};

use super::{clamp_non_negative, RepoError};

/// Body-weight repository.
///
/// Follows the local-first pattern for update and delete. Create additionally
/// attempts the remote call right away so a unique-per-day conflict (409) can
/// be resolved transparently: the repository looks up the day's existing
/// entry and re-issues the change as an update against it, and the caller
/// never sees the conflict. When the remote call fails for any other reason,
/// the create is queued for the next flush like every other mutation.
pub struct WeightRepository {
    store: CollectionStore,
    api: Arc<dyn RemoteApi>,
    queue: Arc<SyncQueue>,
    items: RwLock<Vec<BodyWeightEntry>>,
}

impl WeightRepository {
    pub fn new(store: CollectionStore, api: Arc<dyn RemoteApi>, queue: Arc<SyncQueue>) -> Self {
        Self {
            store,
            api,
            queue,
            items: RwLock::new(Vec::new()),
        }
    }

    pub async fn list(&self) -> Vec<BodyWeightEntry> {
        self.items.read().await.clone()
    }

    pub async fn refresh(&self) -> Result<Vec<BodyWeightEntry>, StoreError> {
        let local: Vec<BodyWeightEntry> = self.store.load(keys::BODY_WEIGHTS).await;
        *self.items.write().await = local.clone();

        match self.api.list_body_weights(None, None).await {
            Ok(remote) => {
                *self.items.write().await = remote.clone();
                self.store.save(keys::BODY_WEIGHTS, &remote).await?;
                Ok(remote)
            }
            Err(e) => {
                tracing::debug!("Weight refresh staying local: {}", e);
                Ok(local)
            }
        }
    }

    pub async fn create(
        &self,
        day: NaiveDate,
        weight_kg: f64,
    ) -> Result<BodyWeightEntry, RepoError> {
        let entry = BodyWeightEntry::new(day, clamp_non_negative(weight_kg));

        let snapshot = {
            let mut items = self.items.write().await;
            items.push(entry.clone());
            items.clone()
        };
        self.store.save(keys::BODY_WEIGHTS, &snapshot).await?;

        let req = BodyWeightCreate {
            id: entry.id,
            day: entry.day,
            weight_kg: entry.weight_kg,
        };
        match self.api.create_body_weight(req.clone()).await {
            Ok(remote) => {
                self.replace_entry(entry.id, remote.clone()).await?;
                Ok(remote)
            }
            Err(e) if e.is_conflict() => match self.resolve_conflict(&req).await {
                Some(resolved) => {
                    self.replace_entry(entry.id, resolved.clone()).await?;
                    Ok(resolved)
                }
                None => {
                    self.enqueue_create(&req).await?;
                    Ok(entry)
                }
            },
            Err(e) => {
                tracing::debug!("Weight create deferred to outbox: {}", e);
                self.enqueue_create(&req).await?;
                Ok(entry)
            }
        }
    }

    pub async fn update(
        &self,
        id: Uuid,
        weight_kg: f64,
    ) -> Result<Option<BodyWeightEntry>, RepoError> {
        let weight_kg = clamp_non_negative(weight_kg);

        let (snapshot, updated) = {
            let mut items = self.items.write().await;
            let Some(entry) = items.iter_mut().find(|w| w.id == id) else {
                return Ok(None);
            };
            entry.weight_kg = weight_kg;
            entry.updated_at = Utc::now();
            let updated = entry.clone();
            (items.clone(), updated)
        };
        self.store.save(keys::BODY_WEIGHTS, &snapshot).await?;

        self.queue
            .enqueue(NewSyncOperation {
                id: op_id(
                    Resource::BodyWeights,
                    Action::Update,
                    id,
                    Some(updated.updated_at),
                ),
                resource: Resource::BodyWeights,
                action: Action::Update,
                payload: json!({ "id": id, "weight_kg": weight_kg }),
            })
            .await?;

        Ok(Some(updated))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let snapshot = {
            let mut items = self.items.write().await;
            let before = items.len();
            items.retain(|w| w.id != id);
            if items.len() == before {
                return Ok(false);
            }
            items.clone()
        };
        self.store.save(keys::BODY_WEIGHTS, &snapshot).await?;

        self.queue
            .enqueue(NewSyncOperation {
                id: op_id(Resource::BodyWeights, Action::Delete, id, None),
                resource: Resource::BodyWeights,
                action: Action::Delete,
                payload: json!({ "id": id }),
            })
            .await?;

        Ok(true)
    }

    /// Swaps the provisional local entry for the server's canonical one.
    async fn replace_entry(
        &self,
        provisional_id: Uuid,
        canonical: BodyWeightEntry,
    ) -> Result<(), StoreError> {
        let snapshot = {
            let mut items = self.items.write().await;
            items.retain(|w| w.id != provisional_id && w.id != canonical.id);
            items.push(canonical);
            items.clone()
        };
        self.store.save(keys::BODY_WEIGHTS, &snapshot).await
    }

    /// Re-issues a conflicted create as an update against the day's existing
    /// entry. Returns `None` when resolution itself fails; the caller then
    /// falls back to the outbox.
    async fn resolve_conflict(&self, req: &BodyWeightCreate) -> Option<BodyWeightEntry> {
        let existing = match self
            .api
            .list_body_weights(Some(req.day), Some(req.day))
            .await
        {
            Ok(entries) => entries.into_iter().find(|w| w.day == req.day)?,
            Err(e) => {
                tracing::debug!("Conflict lookup failed: {}", e);
                return None;
            }
        };
        match self
            .api
            .update_body_weight(
                existing.id,
                BodyWeightPatch {
                    weight_kg: req.weight_kg,
                },
            )
            .await
        {
            Ok(updated) => Some(updated),
            Err(e) => {
                tracing::debug!("Conflict update failed: {}", e);
                None
            }
        }
    }

    async fn enqueue_create(&self, req: &BodyWeightCreate) -> Result<(), RepoError> {
        self.queue
            .enqueue(NewSyncOperation {
                id: op_id(Resource::BodyWeights, Action::Create, req.id, None),
                resource: Resource::BodyWeights,
                action: Action::Create,
                payload: serde_json::to_value(req)?,
            })
            .await?;
        Ok(())
    }
}
