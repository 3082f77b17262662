use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::number::lenient_f64;

/// A body-weight measurement. The server enforces one entry per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyWeightEntry {
    pub id: Uuid,
    pub day: NaiveDate,
    #[serde(deserialize_with = "lenient_f64", default)]
    pub weight_kg: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BodyWeightEntry {
    pub fn new(day: NaiveDate, weight_kg: f64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            day,
            weight_kg,
            created_at: now,
            updated_at: now,
        }
    }
}
