use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{FoodEntry, MealType, Portion, Product, Unit};
use crate::remote::{
    ApiError, FoodEntryCreate, FoodEntryPatch, PortionCreate, ProductCreate, RemoteApi,
};

/// Remote-first food log.
///
/// Unlike the other repositories, every mutation here talks to the server
/// first and local state changes only on success. A day's entries are fetched
/// on demand; a fetch or log already in flight makes concurrent callers
/// return immediately with an empty result instead of piling up requests.
pub struct FoodLog {
    api: Arc<dyn RemoteApi>,
    entries: RwLock<Vec<FoodEntry>>,
    portions: Mutex<HashMap<Uuid, Vec<Portion>>>,
    in_flight: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl FoodLog {
    pub fn new(api: Arc<dyn RemoteApi>) -> Self {
        Self {
            api,
            entries: RwLock::new(Vec::new()),
            portions: Mutex::new(HashMap::new()),
            in_flight: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    /// The entries from the last successful fetch or log.
    pub async fn entries(&self) -> Vec<FoodEntry> {
        self.entries.read().await.clone()
    }

    /// The last remote failure, cleared by the next success.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().unwrap().clone()
    }

    /// Drops memoized portions so the next lookup refetches them.
    pub fn clear_cache(&self) {
        self.portions.lock().unwrap().clear();
    }

    /// Fetches a day's entries from the server.
    ///
    /// When another fetch or log is already in flight, returns `Ok(vec![])`
    /// without touching the server or the cached entries. On failure the
    /// cached entries are left untouched.
    pub async fn refresh_day(&self, day: NaiveDate) -> Result<Vec<FoodEntry>, ApiError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        let result = self.fetch_day(day).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn fetch_day(&self, day: NaiveDate) -> Result<Vec<FoodEntry>, ApiError> {
        match self.api.list_food_entries(day).await {
            Ok(remote) => {
                *self.entries.write().await = remote.clone();
                *self.last_error.lock().unwrap() = None;
                Ok(remote)
            }
            Err(e) => {
                *self.last_error.lock().unwrap() = Some(format!("food entries: {}", e));
                Err(e)
            }
        }
    }

    /// Logs a set of portions eaten at one meal.
    ///
    /// Each item names a product, an amount, and a unit. Products unknown to
    /// the server are created from their local definition, and a product
    /// without portions gets a default portion derived from its nutrition.
    /// Returns the created entries; concurrent callers get `Ok(vec![])` while
    /// a log or fetch is in flight.
    pub async fn log_meal(
        &self,
        day: NaiveDate,
        meal_type: MealType,
        items: &[(Product, f64, Unit)],
    ) -> Result<Vec<FoodEntry>, ApiError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        let result = self.log_meal_inner(day, meal_type, items).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn log_meal_inner(
        &self,
        day: NaiveDate,
        meal_type: MealType,
        items: &[(Product, f64, Unit)],
    ) -> Result<Vec<FoodEntry>, ApiError> {
        let catalog = match self.api.list_products().await {
            Ok(products) => products,
            Err(e) => {
                *self.last_error.lock().unwrap() = Some(format!("food entries: {}", e));
                return Err(e);
            }
        };

        let mut created = Vec::with_capacity(items.len());
        for (product, amount, unit) in items {
            let result = async {
                let remote = self.resolve_product(&catalog, product).await?;
                let portion = self.resolve_portion(&remote).await?;
                self.api
                    .create_food_entry(FoodEntryCreate {
                        product_id: remote.id,
                        portion_id: portion.id,
                        day,
                        meal_type,
                        amount: *amount,
                        unit: *unit,
                    })
                    .await
            }
            .await;
            match result {
                Ok(entry) => created.push(entry),
                Err(e) => {
                    *self.last_error.lock().unwrap() = Some(format!("food entries: {}", e));
                    return Err(e);
                }
            }
        }

        self.entries.write().await.extend(created.iter().cloned());
        *self.last_error.lock().unwrap() = None;
        Ok(created)
    }

    /// Removes an entry on the server, then from the cache. Returns false on
    /// a 404, which means someone else already deleted it.
    pub async fn delete_entry(&self, id: Uuid) -> Result<bool, ApiError> {
        match self.api.delete_food_entry(id).await {
            Ok(()) => {
                self.entries.write().await.retain(|e| e.id != id);
                *self.last_error.lock().unwrap() = None;
                Ok(true)
            }
            Err(e) if e.status() == Some(404) => {
                self.entries.write().await.retain(|e| e.id != id);
                Ok(false)
            }
            Err(e) => {
                *self.last_error.lock().unwrap() = Some(format!("food entries: {}", e));
                Err(e)
            }
        }
    }

    pub async fn update_entry(
        &self,
        id: Uuid,
        patch: FoodEntryPatch,
    ) -> Result<FoodEntry, ApiError> {
        match self.api.update_food_entry(id, patch).await {
            Ok(updated) => {
                let mut entries = self.entries.write().await;
                if let Some(entry) = entries.iter_mut().find(|e| e.id == id) {
                    *entry = updated.clone();
                }
                *self.last_error.lock().unwrap() = None;
                Ok(updated)
            }
            Err(e) => {
                *self.last_error.lock().unwrap() = Some(format!("food entries: {}", e));
                Err(e)
            }
        }
    }

    /// A product's portions, memoized until [`clear_cache`](Self::clear_cache).
    pub async fn portions_for(&self, product_id: Uuid) -> Result<Vec<Portion>, ApiError> {
        if let Some(cached) = self.portions.lock().unwrap().get(&product_id) {
            return Ok(cached.clone());
        }
        let portions = self.api.list_portions(product_id).await?;
        self.portions
            .lock()
            .unwrap()
            .insert(product_id, portions.clone());
        Ok(portions)
    }

    /// Finds the server-side product matching a local one, creating it when
    /// the server has never seen it.
    async fn resolve_product(
        &self,
        catalog: &[Product],
        product: &Product,
    ) -> Result<Product, ApiError> {
        if let Some(found) = catalog
            .iter()
            .find(|p| p.id == product.id || p.name == product.name)
        {
            return Ok(found.clone());
        }
        self.api.create_product(ProductCreate::from(product)).await
    }

    /// The product's default portion, created from its nutrition when the
    /// server has none.
    async fn resolve_portion(&self, product: &Product) -> Result<Portion, ApiError> {
        let portions = self.portions_for(product.id).await?;
        if let Some(portion) = portions
            .iter()
            .find(|p| p.is_default)
            .or_else(|| portions.first())
        {
            return Ok(portion.clone());
        }
        let created = self
            .api
            .create_portion(
                product.id,
                PortionCreate {
                    label: format!("{} {}", product.per_amount, product.per_unit),
                    base_amount: product.per_amount,
                    base_unit: product.per_unit,
                    calories: product.calories,
                    protein: product.protein,
                    carbs: product.carbs,
                    fat: product.fat,
                    is_default: true,
                },
            )
            .await?;
        self.portions
            .lock()
            .unwrap()
            .insert(product.id, vec![created.clone()]);
        Ok(created)
    }
}
