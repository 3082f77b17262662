use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::meal_type::MealType;
use super::number::lenient_f64;
use super::unit::Unit;

/// A named serving size for a product, with nutrition per `base_amount`
/// of `base_unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portion {
    pub id: Uuid,
    pub product_id: Uuid,
    pub label: String,
    #[serde(deserialize_with = "lenient_f64", default)]
    pub base_amount: f64,
    pub base_unit: Unit,
    #[serde(deserialize_with = "lenient_f64", default)]
    pub calories: f64,
    #[serde(deserialize_with = "lenient_f64", default)]
    pub protein: f64,
    #[serde(deserialize_with = "lenient_f64", default)]
    pub carbs: f64,
    #[serde(deserialize_with = "lenient_f64", default)]
    pub fat: f64,
    #[serde(default)]
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One logged consumption of a product portion on a given day.
///
/// Food entries are remote-first: the server is the sole source of truth,
/// and local state is only updated after a successful remote call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: Uuid,
    pub product_id: Uuid,
    pub portion_id: Uuid,
    pub day: NaiveDate,
    pub meal_type: MealType,
    #[serde(deserialize_with = "lenient_f64", default)]
    pub amount: f64,
    pub unit: Unit,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_food_entry_roundtrip() {
        let now = Utc::now();
        let entry = FoodEntry {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            portion_id: Uuid::new_v4(),
            day: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            meal_type: MealType::Lunch,
            amount: 150.0,
            unit: Unit::G,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: FoodEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_portion_tolerates_string_numbers() {
        let json = r#"{
            "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "product_id": "7c9e6679-7425-40de-944b-e07fc1f90ae8",
            "label": "1 cup",
            "base_amount": "240",
            "base_unit": "ml",
            "calories": "",
            "protein": 8.0,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        }"#;
        let portion: Portion = serde_json::from_str(json).unwrap();
        assert_eq!(portion.base_amount, 240.0);
        assert_eq!(portion.calories, 0.0);
        assert_eq!(portion.protein, 8.0);
        assert!(!portion.is_default);
    }
}
