use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::number::lenient_f64;
use super::unit::Unit;

/// One line of a meal: a product and how much of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    pub product_id: Uuid,
    #[serde(deserialize_with = "lenient_f64", default)]
    pub amount: f64,
    pub unit: Unit,
}

impl MealItem {
    pub fn new(product_id: Uuid, amount: f64, unit: Unit) -> Self {
        Self {
            product_id,
            amount,
            unit,
        }
    }
}

/// A reusable meal template made of product items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: Uuid,
    pub name: String,
    pub items: Vec<MealItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Meal {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_items(mut self, items: Vec<MealItem>) -> Self {
        self.items = items;
        self
    }
}
