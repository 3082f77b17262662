use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::number::lenient_f64;
use super::unit::Unit;

/// A food product with nutrition values per `per_amount` of `per_unit`.
///
/// The local copy is the provisional truth until a remote round-trip
/// succeeds; a successful refresh replaces the local collection with the
/// server's list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(deserialize_with = "lenient_f64", default)]
    pub calories: f64,
    #[serde(deserialize_with = "lenient_f64", default)]
    pub protein: f64,
    #[serde(deserialize_with = "lenient_f64", default)]
    pub carbs: f64,
    #[serde(deserialize_with = "lenient_f64", default)]
    pub fat: f64,
    /// Amount the nutrition values are scaled to (typically 100).
    #[serde(deserialize_with = "lenient_f64", default = "default_per_amount")]
    pub per_amount: f64,
    /// Unit of `per_amount` (typically grams).
    #[serde(default = "default_per_unit")]
    pub per_unit: Unit,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_per_amount() -> f64 {
    100.0
}

fn default_per_unit() -> Unit {
    Unit::G
}

impl Product {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
            per_amount: default_per_amount(),
            per_unit: default_per_unit(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_nutrition(mut self, calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        self.calories = calories;
        self.protein = protein;
        self.carbs = carbs;
        self.fat = fat;
        self
    }
}
