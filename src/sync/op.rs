use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource a queued operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    #[serde(rename = "products")]
    Products,
    #[serde(rename = "meals")]
    Meals,
    #[serde(rename = "goals")]
    Goals,
    #[serde(rename = "body-weights")]
    BodyWeights,
    #[serde(rename = "food-entries")]
    FoodEntries,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Resource::Products => "products",
            Resource::Meals => "meals",
            Resource::Goals => "goals",
            Resource::BodyWeights => "body-weights",
            Resource::FoodEntries => "food-entries",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        write!(f, "{}", s)
    }
}

/// Builds the conventional operation id
/// `"{resource}.{action}:{entityId}[:{version}]"`.
///
/// The convention keeps the outbox human-debuggable; the queue itself never
/// parses or deduplicates ids.
pub fn op_id(
    resource: Resource,
    action: Action,
    entity_id: impl fmt::Display,
    version: Option<DateTime<Utc>>,
) -> String {
    match version {
        Some(v) => format!("{}.{}:{}:{}", resource, action, entity_id, v.timestamp_millis()),
        None => format!("{}.{}:{}", resource, action, entity_id),
    }
}

/// A remote mutation as handed to [`enqueue`](crate::sync::SyncQueue::enqueue).
#[derive(Debug, Clone)]
pub struct NewSyncOperation {
    pub id: String,
    pub resource: Resource,
    pub action: Action,
    /// Only the fields the remote call needs, not the full entity.
    pub payload: serde_json::Value,
}

/// One pending remote mutation in the outbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOperation {
    pub id: String,
    pub resource: Resource,
    pub action: Action,
    pub payload: serde_json::Value,
    /// Times a remote call for this operation has failed.
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub next_attempt_at: DateTime<Utc>,
    pub last_error: Option<String>,
}

impl SyncOperation {
    pub fn from_new(op: NewSyncOperation, now: DateTime<Utc>) -> Self {
        Self {
            id: op.id,
            resource: op.resource,
            action: op.action,
            payload: op.payload,
            attempts: 0,
            created_at: now,
            next_attempt_at: now,
            last_error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_op_id_format() {
        let id = Uuid::nil();
        assert_eq!(
            op_id(Resource::Products, Action::Create, id, None),
            format!("products.create:{}", id)
        );

        let version = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(
            op_id(Resource::BodyWeights, Action::Update, id, Some(version)),
            format!("body-weights.update:{}:1700000000123", id)
        );
    }

    #[test]
    fn test_resource_serde_kebab() {
        assert_eq!(
            serde_json::to_string(&Resource::BodyWeights).unwrap(),
            "\"body-weights\""
        );
        let r: Resource = serde_json::from_str("\"food-entries\"").unwrap();
        assert_eq!(r, Resource::FoodEntries);
    }

    #[test]
    fn test_operation_json_roundtrip() {
        let op = SyncOperation::from_new(
            NewSyncOperation {
                id: "products.create:x".into(),
                resource: Resource::Products,
                action: Action::Create,
                payload: serde_json::json!({"name": "Oats"}),
            },
            Utc::now(),
        );
        let json = serde_json::to_string(&op).unwrap();
        let parsed: SyncOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, op.id);
        assert_eq!(parsed.attempts, 0);
        assert_eq!(parsed.next_attempt_at, op.created_at);
        assert!(parsed.last_error.is_none());
    }
}
