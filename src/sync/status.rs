//! Aggregated sync status and the manual-flush entry point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::StoreError;

use super::connectivity::Connectivity;
use super::queue::{FlushReport, SyncQueue};

/// Snapshot of everything a status screen needs.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    pub server_url: String,
    pub device_id: Option<Uuid>,
    pub online: bool,
    pub pending: usize,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub last_sync_error: Option<String>,
    pub flushing: bool,
}

/// Aggregates connectivity, queue size, and last-sync bookkeeping, and
/// serializes manual flushes.
pub struct SyncStatusReporter {
    queue: Arc<SyncQueue>,
    connectivity: Arc<dyn Connectivity>,
    server_url: String,
    device_id: Option<Uuid>,
    flushing: AtomicBool,
    current: RwLock<Option<SyncStatus>>,
}

impl SyncStatusReporter {
    pub fn new(
        queue: Arc<SyncQueue>,
        connectivity: Arc<dyn Connectivity>,
        server_url: impl Into<String>,
        device_id: Option<Uuid>,
    ) -> Self {
        Self {
            queue,
            connectivity,
            server_url: server_url.into(),
            device_id,
            flushing: AtomicBool::new(false),
            current: RwLock::new(None),
        }
    }

    /// Recomputes and caches the status snapshot.
    pub async fn refresh(&self) -> SyncStatus {
        let status = SyncStatus {
            server_url: self.server_url.clone(),
            device_id: self.device_id,
            online: self.connectivity.is_online(),
            pending: self.queue.queue().await.len(),
            last_sync_at: self.queue.last_sync_at().await,
            last_sync_error: self.queue.last_sync_error().await,
            flushing: self.flushing.load(Ordering::SeqCst),
        };
        *self.current.write().await = Some(status.clone());
        status
    }

    /// Last computed snapshot, refreshing if none exists yet.
    pub async fn current(&self) -> SyncStatus {
        if let Some(status) = self.current.read().await.clone() {
            return status;
        }
        self.refresh().await
    }

    /// Flushes the queue once, guarding against re-entrant invocations.
    ///
    /// Returns `Ok(None)` when a flush is already in progress. The guard is
    /// cleared and the status snapshot recomputed whether or not the flush
    /// succeeded.
    pub async fn flush_now(&self) -> Result<Option<FlushReport>, StoreError> {
        if self.flushing.swap(true, Ordering::SeqCst) {
            tracing::debug!("Flush already in progress, skipping");
            return Ok(None);
        }

        let result = self.queue.flush().await;

        self.flushing.store(false, Ordering::SeqCst);
        self.refresh().await;

        result.map(Some)
    }
}
