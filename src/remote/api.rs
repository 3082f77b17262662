use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{BodyWeightEntry, FoodEntry, Meal, MealItem, MealType, Portion, Product, Unit, UserGoal};

use super::error::ApiError;

/// Create request for a product. The client assigns the id so an offline
/// creation keeps its identity once replayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub id: Uuid,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub per_amount: f64,
    pub per_unit: Unit,
}

impl From<&Product> for ProductCreate {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fat: p.fat,
            per_amount: p.per_amount,
            per_unit: p.per_unit,
        }
    }
}

/// Minimal delta for a product update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealCreate {
    pub id: Uuid,
    pub name: String,
    pub items: Vec<MealItem>,
}

impl From<&Meal> for MealCreate {
    fn from(m: &Meal) -> Self {
        Self {
            id: m.id,
            name: m.name.clone(),
            items: m.items.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<MealItem>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalCreate {
    pub id: Uuid,
    pub daily_calories_kcal: u32,
    pub protein_percent: u8,
    pub carbs_percent: u8,
    pub fat_percent: u8,
    pub water_ml: u32,
}

impl From<&UserGoal> for GoalCreate {
    fn from(g: &UserGoal) -> Self {
        Self {
            id: g.id,
            daily_calories_kcal: g.daily_calories_kcal,
            protein_percent: g.protein_percent,
            carbs_percent: g.carbs_percent,
            fat_percent: g.fat_percent,
            water_ml: g.water_ml,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_calories_kcal: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_percent: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs_percent: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat_percent: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_ml: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyWeightCreate {
    pub id: Uuid,
    pub day: NaiveDate,
    pub weight_kg: f64,
}

/// Weight updates send `weight_kg` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyWeightPatch {
    pub weight_kg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodEntryCreate {
    pub product_id: Uuid,
    pub portion_id: Uuid,
    pub day: NaiveDate,
    pub meal_type: MealType,
    pub amount: f64,
    pub unit: Unit,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodEntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portion_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<MealType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortionCreate {
    pub label: String,
    pub base_amount: f64,
    pub base_unit: Unit,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub is_default: bool,
}

/// Per-resource CRUD against the CountOnMe backend.
///
/// Create and update payloads are minimal deltas, not full entities. List
/// calls return the canonical server representation, which replaces the
/// local cache on a successful refresh.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    // Products
    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;
    async fn create_product(&self, req: ProductCreate) -> Result<Product, ApiError>;
    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Product, ApiError>;
    async fn delete_product(&self, id: Uuid) -> Result<(), ApiError>;

    // Meals
    async fn list_meals(&self) -> Result<Vec<Meal>, ApiError>;
    async fn create_meal(&self, req: MealCreate) -> Result<Meal, ApiError>;
    async fn update_meal(&self, id: Uuid, patch: MealPatch) -> Result<Meal, ApiError>;
    async fn delete_meal(&self, id: Uuid) -> Result<(), ApiError>;

    // Goals
    async fn list_goals(&self) -> Result<Vec<UserGoal>, ApiError>;
    async fn create_goal(&self, req: GoalCreate) -> Result<UserGoal, ApiError>;
    async fn update_goal(&self, id: Uuid, patch: GoalPatch) -> Result<UserGoal, ApiError>;
    async fn delete_goal(&self, id: Uuid) -> Result<(), ApiError>;

    // Body weights
    async fn list_body_weights(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<BodyWeightEntry>, ApiError>;
    async fn create_body_weight(&self, req: BodyWeightCreate)
        -> Result<BodyWeightEntry, ApiError>;
    async fn update_body_weight(
        &self,
        id: Uuid,
        patch: BodyWeightPatch,
    ) -> Result<BodyWeightEntry, ApiError>;
    async fn delete_body_weight(&self, id: Uuid) -> Result<(), ApiError>;

    // Food entries (remote-first)
    async fn list_food_entries(&self, day: NaiveDate) -> Result<Vec<FoodEntry>, ApiError>;
    async fn create_food_entry(&self, req: FoodEntryCreate) -> Result<FoodEntry, ApiError>;
    async fn update_food_entry(
        &self,
        id: Uuid,
        patch: FoodEntryPatch,
    ) -> Result<FoodEntry, ApiError>;
    async fn delete_food_entry(&self, id: Uuid) -> Result<(), ApiError>;

    // Portions
    async fn list_portions(&self, product_id: Uuid) -> Result<Vec<Portion>, ApiError>;
    async fn create_portion(
        &self,
        product_id: Uuid,
        req: PortionCreate,
    ) -> Result<Portion, ApiError>;
}
