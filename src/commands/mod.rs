//! CLI subcommands. Thin wrappers over the library: each command builds a
//! tokio runtime, wires the engine from config, and blocks on the work.

mod product;
mod register;
mod status_cmd;
mod sync_cmd;
mod weight;

pub use product::ProductCommand;
pub use register::RegisterCommand;
pub use status_cmd::StatusCommand;
pub use sync_cmd::SyncCommand;
pub use weight::WeightCommand;

use std::sync::Arc;

use thiserror::Error;

use crate::config::Config;
use crate::device::DeviceIdentity;
use crate::remote::{ApiError, HttpApi};
use crate::store::{CollectionStore, FileStore, KeyValueStore, StoreError};
use crate::sync::{NetworkMonitor, SyncQueue, SyncStatusReporter};

/// Errors surfaced to the CLI user.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Sync is not configured. Set server_url and device_token in the config file, or run 'com register'")]
    NotConfigured,
    #[error("No server URL configured. Pass --server or set COM_SERVER_URL")]
    NoServer,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Repo(#[from] crate::repo::RepoError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Runtime error: {0}")]
    Runtime(String),
    #[error("{0}")]
    InvalidInput(String),
}

/// Everything a sync-aware command needs, wired from config.
pub(crate) struct SyncContext {
    pub store: CollectionStore,
    pub api: Arc<HttpApi>,
    pub monitor: Arc<NetworkMonitor>,
    pub queue: Arc<SyncQueue>,
    pub reporter: SyncStatusReporter,
    pub server_url: String,
}

impl SyncContext {
    pub async fn from_config(config: &Config) -> Result<Self, CommandError> {
        let kv: Arc<dyn KeyValueStore> =
            Arc::new(FileStore::new(config.data_dir.value.clone()));
        let identity = DeviceIdentity::load(kv.as_ref()).await;

        let server_url = config
            .sync
            .server_url
            .clone()
            .ok_or(CommandError::NotConfigured)?;
        let token = config
            .sync
            .device_token
            .clone()
            .or_else(|| identity.as_ref().map(|i| i.device_token.clone()))
            .ok_or(CommandError::NotConfigured)?;

        let store = CollectionStore::new(kv);
        let api = Arc::new(HttpApi::new(&server_url, token));
        let monitor = Arc::new(NetworkMonitor::new(false));
        let queue = Arc::new(SyncQueue::new(
            store.clone(),
            api.clone(),
            monitor.clone(),
        ));
        let reporter = SyncStatusReporter::new(
            queue.clone(),
            monitor.clone(),
            server_url.clone(),
            identity.map(|i| i.device_id),
        );

        Ok(Self {
            store,
            api,
            monitor,
            queue,
            reporter,
            server_url,
        })
    }

    /// Probes the server and updates the connectivity signal.
    pub async fn probe(&self) -> bool {
        self.monitor.probe(&self.server_url).await
    }
}

/// Flushes the outbox after a write when auto-sync is on. Degrades silently:
/// a failed or skipped flush just leaves the operations queued.
pub(crate) async fn try_auto_flush(config: &Config, ctx: &SyncContext) {
    if !config.sync.auto_sync {
        return;
    }
    ctx.probe().await;
    match ctx.reporter.flush_now().await {
        Ok(Some(report)) if report.remaining > 0 => {
            tracing::debug!("Auto-flush left {} operations queued", report.remaining);
        }
        Ok(_) => {}
        Err(e) => tracing::debug!("Auto-flush failed: {}", e),
    }
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, CommandError> {
    tokio::runtime::Runtime::new().map_err(|e| CommandError::Runtime(e.to_string()))
}
