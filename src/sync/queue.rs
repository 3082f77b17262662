//! Durable FIFO outbox of pending remote mutations.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::remote::{
    ApiError, BodyWeightCreate, BodyWeightPatch, FoodEntryCreate, FoodEntryPatch, GoalCreate,
    GoalPatch, MealCreate, MealPatch, ProductCreate, ProductPatch, RemoteApi,
};
use crate::store::{keys, CollectionStore, StoreError};

use super::connectivity::Connectivity;
use super::op::{Action, NewSyncOperation, Resource, SyncOperation};

/// Aggregate counts for one flush pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Operations dispatched to the remote API.
    pub attempted: usize,
    /// Operations removed from the queue after a successful remote call.
    pub succeeded: usize,
    /// Operations still queued after the pass.
    pub remaining: usize,
    /// Operations left untouched because their next attempt lies in the future.
    pub skipped: usize,
    /// True when the device was offline and nothing was touched.
    pub offline: bool,
}

/// Retry delay as a function of failed attempts: 5 s doubling per attempt,
/// capped at one hour.
fn backoff(attempts: u32) -> Duration {
    const BASE_SECS: i64 = 5;
    const CAP_SECS: i64 = 3600;
    let exp = attempts.saturating_sub(1).min(16);
    Duration::seconds((BASE_SECS << exp).min(CAP_SECS))
}

/// Payload wrapper for update operations: the target id plus the patch fields.
#[derive(Debug, Deserialize)]
struct WithId<P> {
    id: Uuid,
    #[serde(flatten)]
    patch: P,
}

#[derive(Debug, Deserialize)]
struct IdOnly {
    id: Uuid,
}

fn decode<T: DeserializeOwned>(payload: &serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(payload.clone()).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Persistent outbox. Insertion order is preserved across process restarts
/// and is never reshuffled, only filtered: skipped operations keep their
/// position for the next flush.
///
/// The queue does not deduplicate — callers construct semantically stable
/// operation ids (see [`op_id`](super::op_id)) when they need to tell
/// repeated enqueues apart.
///
/// `flush` performs no internal locking; callers serialize invocations (the
/// status reporter's guard does this for manual flushes).
pub struct SyncQueue {
    store: CollectionStore,
    api: Arc<dyn RemoteApi>,
    connectivity: Arc<dyn Connectivity>,
}

impl SyncQueue {
    pub fn new(
        store: CollectionStore,
        api: Arc<dyn RemoteApi>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        Self {
            store,
            api,
            connectivity,
        }
    }

    /// Appends an operation to the persisted queue.
    pub async fn enqueue(&self, op: NewSyncOperation) -> Result<(), StoreError> {
        let mut ops = self.queue().await;
        tracing::debug!("Enqueueing {}", op.id);
        ops.push(SyncOperation::from_new(op, Utc::now()));
        self.store.save(keys::SYNC_QUEUE, &ops).await
    }

    /// Current queue snapshot, oldest first.
    pub async fn queue(&self) -> Vec<SyncOperation> {
        self.store.load(keys::SYNC_QUEUE).await
    }

    pub async fn last_sync_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.store.kv().get(keys::LAST_SYNC_AT).await?;
        DateTime::parse_from_rfc3339(&raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub async fn last_sync_error(&self) -> Option<String> {
        self.store.kv().get(keys::LAST_SYNC_ERROR).await
    }

    /// Replays queued operations against the remote API, in insertion order.
    ///
    /// Offline is not an error: the queue is left untouched and the report
    /// says so. Each operation is processed independently — one failure does
    /// not stall the operations behind it, since unrelated resources must not
    /// block each other.
    pub async fn flush(&self) -> Result<FlushReport, StoreError> {
        let ops = self.queue().await;

        if !self.connectivity.is_online() {
            tracing::debug!("Offline, leaving {} queued operation(s)", ops.len());
            return Ok(FlushReport {
                remaining: ops.len(),
                offline: true,
                ..FlushReport::default()
            });
        }

        let mut report = FlushReport::default();
        let mut kept: Vec<SyncOperation> = Vec::with_capacity(ops.len());
        let mut pass_error: Option<String> = None;

        for mut op in ops {
            let now = Utc::now();
            if op.next_attempt_at > now {
                report.skipped += 1;
                kept.push(op);
                continue;
            }

            report.attempted += 1;
            match self.dispatch(&op).await {
                Ok(()) => {
                    report.succeeded += 1;
                    tracing::debug!("Synced {}", op.id);
                }
                Err(e) => {
                    let message = e.to_string();
                    tracing::warn!(
                        "Sync of {} failed (attempt {}): {}",
                        op.id,
                        op.attempts + 1,
                        message
                    );
                    op.attempts += 1;
                    op.last_error = Some(message.clone());
                    op.next_attempt_at = now + backoff(op.attempts);
                    pass_error = Some(message);
                    kept.push(op);
                }
            }
        }

        report.remaining = kept.len();
        self.store.save(keys::SYNC_QUEUE, &kept).await?;

        match pass_error {
            Some(message) => {
                self.store.kv().set(keys::LAST_SYNC_ERROR, &message).await?;
            }
            None => {
                self.store.kv().remove(keys::LAST_SYNC_ERROR).await?;
                self.store
                    .kv()
                    .set(keys::LAST_SYNC_AT, &Utc::now().to_rfc3339())
                    .await?;
            }
        }

        Ok(report)
    }

    /// Routes one operation to the remote call selected by (resource, action).
    async fn dispatch(&self, op: &SyncOperation) -> Result<(), ApiError> {
        match (op.resource, op.action) {
            (Resource::Products, Action::Create) => {
                self.api.create_product(decode::<ProductCreate>(&op.payload)?).await?;
            }
            (Resource::Products, Action::Update) => {
                let p: WithId<ProductPatch> = decode(&op.payload)?;
                self.api.update_product(p.id, p.patch).await?;
            }
            (Resource::Products, Action::Delete) => {
                self.api.delete_product(decode::<IdOnly>(&op.payload)?.id).await?;
            }
            (Resource::Meals, Action::Create) => {
                self.api.create_meal(decode::<MealCreate>(&op.payload)?).await?;
            }
            (Resource::Meals, Action::Update) => {
                let p: WithId<MealPatch> = decode(&op.payload)?;
                self.api.update_meal(p.id, p.patch).await?;
            }
            (Resource::Meals, Action::Delete) => {
                self.api.delete_meal(decode::<IdOnly>(&op.payload)?.id).await?;
            }
            (Resource::Goals, Action::Create) => {
                self.api.create_goal(decode::<GoalCreate>(&op.payload)?).await?;
            }
            (Resource::Goals, Action::Update) => {
                let p: WithId<GoalPatch> = decode(&op.payload)?;
                self.api.update_goal(p.id, p.patch).await?;
            }
            (Resource::Goals, Action::Delete) => {
                self.api.delete_goal(decode::<IdOnly>(&op.payload)?.id).await?;
            }
            (Resource::BodyWeights, Action::Create) => {
                let req: BodyWeightCreate = decode(&op.payload)?;
                match self.api.create_body_weight(req.clone()).await {
                    Ok(_) => {}
                    Err(e) if e.is_conflict() => self.resolve_weight_conflict(req).await?,
                    Err(e) => return Err(e),
                }
            }
            (Resource::BodyWeights, Action::Update) => {
                let p: WithId<BodyWeightPatch> = decode(&op.payload)?;
                self.api.update_body_weight(p.id, p.patch).await?;
            }
            (Resource::BodyWeights, Action::Delete) => {
                self.api.delete_body_weight(decode::<IdOnly>(&op.payload)?.id).await?;
            }
            (Resource::FoodEntries, Action::Create) => {
                self.api.create_food_entry(decode::<FoodEntryCreate>(&op.payload)?).await?;
            }
            (Resource::FoodEntries, Action::Update) => {
                let p: WithId<FoodEntryPatch> = decode(&op.payload)?;
                self.api.update_food_entry(p.id, p.patch).await?;
            }
            (Resource::FoodEntries, Action::Delete) => {
                self.api.delete_food_entry(decode::<IdOnly>(&op.payload)?.id).await?;
            }
        }
        Ok(())
    }

    /// A 409 on weight creation means the day already has an entry; re-issue
    /// the change as an update against that entry instead of retrying as-is.
    async fn resolve_weight_conflict(&self, req: BodyWeightCreate) -> Result<(), ApiError> {
        let existing = self
            .api
            .list_body_weights(Some(req.day), Some(req.day))
            .await?;
        let Some(entry) = existing.into_iter().find(|w| w.day == req.day) else {
            return Err(ApiError::Status {
                status: 409,
                message: format!("No existing weight entry found for {}", req.day),
            });
        };
        self.api
            .update_body_weight(
                entry.id,
                BodyWeightPatch {
                    weight_kg: req.weight_kg,
                },
            )
            .await?;
        Ok(())
    }
}
