//! Scriptable in-memory [`RemoteApi`] for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::models::{BodyWeightEntry, FoodEntry, Meal, Portion, Product, UserGoal};

use super::api::*;
use super::error::ApiError;

/// Fake server: holds canonical collections, records every call, and can be
/// scripted to fail or to stall inside a call.
#[derive(Default)]
pub(crate) struct MockApi {
    pub calls: Mutex<Vec<String>>,
    pub products: Mutex<Vec<Product>>,
    pub meals: Mutex<Vec<Meal>>,
    pub goals: Mutex<Vec<UserGoal>>,
    pub weights: Mutex<Vec<BodyWeightEntry>>,
    pub entries: Mutex<Vec<FoodEntry>>,
    pub portions: Mutex<HashMap<Uuid, Vec<Portion>>>,
    /// When set, every call fails with a clone of this error.
    pub error: Mutex<Option<ApiError>>,
    /// When true, `create_body_weight` answers 409.
    pub weight_conflict: AtomicBool,
    /// When set, `list_products` blocks until notified.
    pub gate: Mutex<Option<Arc<Notify>>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_error(&self, error: Option<ApiError>) {
        *self.error.lock().unwrap() = error;
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, name: &str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(name.to_string());
        match self.error.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn not_found() -> ApiError {
        ApiError::Status {
            status: 404,
            message: "Not found".into(),
        }
    }
}

#[async_trait]
impl RemoteApi for MockApi {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.record("list_products")?;
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(self.products.lock().unwrap().clone())
    }

    async fn create_product(&self, req: ProductCreate) -> Result<Product, ApiError> {
        self.record("create_product")?;
        let now = Utc::now();
        let product = Product {
            id: req.id,
            name: req.name,
            calories: req.calories,
            protein: req.protein,
            carbs: req.carbs,
            fat: req.fat,
            per_amount: req.per_amount,
            per_unit: req.per_unit,
            created_at: now,
            updated_at: now,
        };
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Product, ApiError> {
        self.record("update_product")?;
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(Self::not_found)?;
        product.name = patch.name;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), ApiError> {
        self.record("delete_product")?;
        self.products.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }

    async fn list_meals(&self) -> Result<Vec<Meal>, ApiError> {
        self.record("list_meals")?;
        Ok(self.meals.lock().unwrap().clone())
    }

    async fn create_meal(&self, req: MealCreate) -> Result<Meal, ApiError> {
        self.record("create_meal")?;
        let now = Utc::now();
        let meal = Meal {
            id: req.id,
            name: req.name,
            items: req.items,
            created_at: now,
            updated_at: now,
        };
        self.meals.lock().unwrap().push(meal.clone());
        Ok(meal)
    }

    async fn update_meal(&self, id: Uuid, patch: MealPatch) -> Result<Meal, ApiError> {
        self.record("update_meal")?;
        let mut meals = self.meals.lock().unwrap();
        let meal = meals
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(Self::not_found)?;
        if let Some(name) = patch.name {
            meal.name = name;
        }
        if let Some(items) = patch.items {
            meal.items = items;
        }
        meal.updated_at = Utc::now();
        Ok(meal.clone())
    }

    async fn delete_meal(&self, id: Uuid) -> Result<(), ApiError> {
        self.record("delete_meal")?;
        self.meals.lock().unwrap().retain(|m| m.id != id);
        Ok(())
    }

    async fn list_goals(&self) -> Result<Vec<UserGoal>, ApiError> {
        self.record("list_goals")?;
        Ok(self.goals.lock().unwrap().clone())
    }

    async fn create_goal(&self, req: GoalCreate) -> Result<UserGoal, ApiError> {
        self.record("create_goal")?;
        let now = Utc::now();
        let goal = UserGoal {
            id: req.id,
            daily_calories_kcal: req.daily_calories_kcal,
            protein_percent: req.protein_percent,
            carbs_percent: req.carbs_percent,
            fat_percent: req.fat_percent,
            water_ml: req.water_ml,
            created_at: now,
            updated_at: now,
        };
        self.goals.lock().unwrap().push(goal.clone());
        Ok(goal)
    }

    async fn update_goal(&self, id: Uuid, patch: GoalPatch) -> Result<UserGoal, ApiError> {
        self.record("update_goal")?;
        let mut goals = self.goals.lock().unwrap();
        let goal = goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(Self::not_found)?;
        if let Some(v) = patch.daily_calories_kcal {
            goal.daily_calories_kcal = v;
        }
        if let Some(v) = patch.protein_percent {
            goal.protein_percent = v;
        }
        if let Some(v) = patch.carbs_percent {
            goal.carbs_percent = v;
        }
        if let Some(v) = patch.fat_percent {
            goal.fat_percent = v;
        }
        if let Some(v) = patch.water_ml {
            goal.water_ml = v;
        }
        goal.updated_at = Utc::now();
        Ok(goal.clone())
    }

    async fn delete_goal(&self, id: Uuid) -> Result<(), ApiError> {
        self.record("delete_goal")?;
        self.goals.lock().unwrap().retain(|g| g.id != id);
        Ok(())
    }

    async fn list_body_weights(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<BodyWeightEntry>, ApiError> {
        self.record("list_body_weights")?;
        Ok(self
            .weights
            .lock()
            .unwrap()
            .iter()
            .filter(|w| from.map_or(true, |d| w.day >= d) && to.map_or(true, |d| w.day <= d))
            .cloned()
            .collect())
    }

    async fn create_body_weight(
        &self,
        req: BodyWeightCreate,
    ) -> Result<BodyWeightEntry, ApiError> {
        self.record("create_body_weight")?;
        if self.weight_conflict.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 409,
                message: "weight already recorded for this day".into(),
            });
        }
        let now = Utc::now();
        let entry = BodyWeightEntry {
            id: req.id,
            day: req.day,
            weight_kg: req.weight_kg,
            created_at: now,
            updated_at: now,
        };
        self.weights.lock().unwrap().push(entry.clone());
        Ok(entry)
    }

    async fn update_body_weight(
        &self,
        id: Uuid,
        patch: BodyWeightPatch,
    ) -> Result<BodyWeightEntry, ApiError> {
        self.record("update_body_weight")?;
        let mut weights = self.weights.lock().unwrap();
        let entry = weights
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(Self::not_found)?;
        entry.weight_kg = patch.weight_kg;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete_body_weight(&self, id: Uuid) -> Result<(), ApiError> {
        self.record("delete_body_weight")?;
        self.weights.lock().unwrap().retain(|w| w.id != id);
        Ok(())
    }

    async fn list_food_entries(&self, day: NaiveDate) -> Result<Vec<FoodEntry>, ApiError> {
        self.record("list_food_entries")?;
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.day == day)
            .cloned()
            .collect())
    }

    async fn create_food_entry(&self, req: FoodEntryCreate) -> Result<FoodEntry, ApiError> {
        self.record("create_food_entry")?;
        let now = Utc::now();
        let entry = FoodEntry {
            id: Uuid::new_v4(),
            product_id: req.product_id,
            portion_id: req.portion_id,
            day: req.day,
            meal_type: req.meal_type,
            amount: req.amount,
            unit: req.unit,
            created_at: now,
            updated_at: now,
        };
        self.entries.lock().unwrap().push(entry.clone());
        Ok(entry)
    }

    async fn update_food_entry(
        &self,
        id: Uuid,
        patch: FoodEntryPatch,
    ) -> Result<FoodEntry, ApiError> {
        self.record("update_food_entry")?;
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(Self::not_found)?;
        if let Some(v) = patch.portion_id {
            entry.portion_id = v;
        }
        if let Some(v) = patch.meal_type {
            entry.meal_type = v;
        }
        if let Some(v) = patch.amount {
            entry.amount = v;
        }
        if let Some(v) = patch.unit {
            entry.unit = v;
        }
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete_food_entry(&self, id: Uuid) -> Result<(), ApiError> {
        self.record("delete_food_entry")?;
        self.entries.lock().unwrap().retain(|e| e.id != id);
        Ok(())
    }

    async fn list_portions(&self, product_id: Uuid) -> Result<Vec<Portion>, ApiError> {
        self.record("list_portions")?;
        Ok(self
            .portions
            .lock()
            .unwrap()
            .get(&product_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_portion(
        &self,
        product_id: Uuid,
        req: PortionCreate,
    ) -> Result<Portion, ApiError> {
        self.record("create_portion")?;
        let now = Utc::now();
        let portion = Portion {
            id: Uuid::new_v4(),
            product_id,
            label: req.label,
            base_amount: req.base_amount,
            base_unit: req.base_unit,
            calories: req.calories,
            protein: req.protein,
            carbs: req.carbs,
            fat: req.fat,
            is_default: req.is_default,
            created_at: now,
            updated_at: now,
        };
        self.portions
            .lock()
            .unwrap()
            .entry(product_id)
            .or_default()
            .push(portion.clone());
        Ok(portion)
    }
}
