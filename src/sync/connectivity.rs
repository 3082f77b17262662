use tokio::sync::watch;

use crate::remote::check_server;

/// Push-based connectivity signal.
pub trait Connectivity: Send + Sync {
    /// Is the device online right now?
    fn is_online(&self) -> bool;

    /// Subscribes to connectivity-change events.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Connectivity monitor fed by the server health probe (or manually in tests).
#[derive(Debug)]
pub struct NetworkMonitor {
    tx: watch::Sender<bool>,
}

impl NetworkMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (tx, _) = watch::channel(initially_online);
        Self { tx }
    }

    pub fn set_online(&self, online: bool) {
        // send_if_modified keeps subscribers quiet when nothing changed.
        self.tx.send_if_modified(|current| {
            if *current != online {
                tracing::debug!("Connectivity changed: online={}", online);
                *current = online;
                true
            } else {
                false
            }
        });
    }

    /// Probes the server health endpoint and updates the signal.
    pub async fn probe(&self, server_url: &str) -> bool {
        let online = check_server(server_url).await;
        self.set_online(online);
        online
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Connectivity for NetworkMonitor {
    fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}
