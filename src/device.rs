//! Persisted device identity.
//!
//! The backend issues a bearer token at registration; both halves are kept
//! together in the local store so subsequent runs can authenticate without
//! re-registering.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{keys, KeyValueStore, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub device_id: Uuid,
    pub device_token: String,
}

impl DeviceIdentity {
    pub fn new(device_id: Uuid, device_token: impl Into<String>) -> Self {
        Self {
            device_id,
            device_token: device_token.into(),
        }
    }

    /// Loads the stored identity, if any. Unreadable data counts as absent.
    pub async fn load(kv: &dyn KeyValueStore) -> Option<Self> {
        let raw = kv.get(keys::DEVICE).await?;
        match serde_json::from_str(&raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::warn!("Discarding unreadable device identity: {}", e);
                None
            }
        }
    }

    pub async fn save(&self, kv: &dyn KeyValueStore) -> Result<(), StoreError> {
        let raw = serde_json::to_string(self).map_err(|source| StoreError::Serialize {
            key: keys::DEVICE.to_string(),
            source,
        })?;
        kv.set(keys::DEVICE, &raw).await
    }
}
