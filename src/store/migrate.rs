//! Forward migration of older on-disk collection shapes.
//!
//! When a versioned key is empty but its predecessor has data, the old
//! records are transformed into the current shape, written back under the new
//! key, and returned. Migration is best-effort: a write failure must not
//! break the read path.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{lenient_f64, Meal, MealItem, Product, Unit};

use super::collection::{keys, CollectionStore};

/// v1 products carried nutrition implicitly per 100 g, without scale metadata.
#[derive(Debug, Deserialize)]
struct ProductV1 {
    id: Uuid,
    name: String,
    #[serde(deserialize_with = "lenient_f64", default)]
    calories: f64,
    #[serde(deserialize_with = "lenient_f64", default)]
    protein: f64,
    #[serde(deserialize_with = "lenient_f64", default)]
    carbs: f64,
    #[serde(deserialize_with = "lenient_f64", default)]
    fat: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// v1 meal items were gram-only.
#[derive(Debug, Deserialize)]
struct MealItemV1 {
    product_id: Uuid,
    #[serde(deserialize_with = "lenient_f64", default)]
    grams: f64,
}

#[derive(Debug, Deserialize)]
struct MealV1 {
    id: Uuid,
    name: String,
    #[serde(default)]
    items: Vec<MealItemV1>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Loads products, migrating the v1 collection forward if v2 is empty.
pub async fn load_products(store: &CollectionStore) -> Vec<Product> {
    let current: Vec<Product> = store.load(keys::PRODUCTS).await;
    if !current.is_empty() || !store.begin_migration(keys::PRODUCTS) {
        return current;
    }

    let legacy: Vec<ProductV1> = store.load(keys::PRODUCTS_V1).await;
    if legacy.is_empty() {
        return current;
    }

    let migrated: Vec<Product> = legacy
        .into_iter()
        .map(|p| Product {
            id: p.id,
            name: p.name,
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fat: p.fat,
            per_amount: 100.0,
            per_unit: Unit::G,
            created_at: p.created_at,
            updated_at: p.updated_at,
        })
        .collect();

    if let Err(e) = store.save(keys::PRODUCTS, &migrated).await {
        tracing::warn!("Product migration write failed: {}", e);
    }
    tracing::info!("Migrated {} product(s) from v1", migrated.len());
    migrated
}

/// Loads meals, migrating gram-only v1 items to `{amount, unit}` if v2 is empty.
pub async fn load_meals(store: &CollectionStore) -> Vec<Meal> {
    let current: Vec<Meal> = store.load(keys::MEALS).await;
    if !current.is_empty() || !store.begin_migration(keys::MEALS) {
        return current;
    }

    let legacy: Vec<MealV1> = store.load(keys::MEALS_V1).await;
    if legacy.is_empty() {
        return current;
    }

    let migrated: Vec<Meal> = legacy
        .into_iter()
        .map(|m| Meal {
            id: m.id,
            name: m.name,
            items: m
                .items
                .into_iter()
                .map(|i| MealItem::new(i.product_id, i.grams, Unit::G))
                .collect(),
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
        .collect();

    if let Err(e) = store.save(keys::MEALS, &migrated).await {
        tracing::warn!("Meal migration write failed: {}", e);
    }
    tracing::info!("Migrated {} meal(s) from v1", migrated.len());
    migrated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    fn store() -> (CollectionStore, Arc<MemoryStore>) {
        let kv = Arc::new(MemoryStore::new());
        (CollectionStore::new(kv.clone() as Arc<dyn KeyValueStore>), kv)
    }

    fn v1_meal_json() -> String {
        format!(
            r#"[{{
                "id": "{}",
                "name": "Porridge",
                "items": [{{"product_id": "{}", "grams": 60}}],
                "created_at": "2024-06-01T00:00:00Z",
                "updated_at": "2024-06-01T00:00:00Z"
            }}]"#,
            Uuid::new_v4(),
            Uuid::new_v4()
        )
    }

    #[tokio::test]
    async fn test_meal_migration_converts_grams_to_units() {
        let (store, kv) = store();
        kv.set(keys::MEALS_V1, &v1_meal_json()).await.unwrap();

        let meals = load_meals(&store).await;
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].items[0].amount, 60.0);
        assert_eq!(meals[0].items[0].unit, Unit::G);

        // Written back under the v2 key.
        let persisted: Vec<Meal> = store.load(keys::MEALS).await;
        assert_eq!(persisted, meals);
    }

    #[tokio::test]
    async fn test_migration_skipped_when_v2_present() {
        let (store, kv) = store();
        kv.set(keys::MEALS_V1, &v1_meal_json()).await.unwrap();
        let existing = vec![Meal::new("Already here")];
        store.save(keys::MEALS, &existing).await.unwrap();

        let meals = load_meals(&store).await;
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].name, "Already here");
    }

    #[tokio::test]
    async fn test_migration_runs_once_per_cold_start() {
        let (store, kv) = store();
        kv.set(keys::MEALS_V1, &v1_meal_json()).await.unwrap();

        let first = load_meals(&store).await;
        assert_eq!(first.len(), 1);

        // Wipe v2; a second load in the same process must not re-migrate.
        kv.remove(keys::MEALS).await.unwrap();
        let second = load_meals(&store).await;
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_migration_write_failure_still_returns_data() {
        let (store, kv) = store();
        kv.set(keys::MEALS_V1, &v1_meal_json()).await.unwrap();
        kv.fail_writes(true);

        let meals = load_meals(&store).await;
        assert_eq!(meals.len(), 1);
    }

    #[tokio::test]
    async fn test_product_migration_backfills_scale() {
        let (store, kv) = store();
        let json = format!(
            r#"[{{
                "id": "{}",
                "name": "Oats",
                "calories": "389",
                "protein": 16.9,
                "carbs": 66.3,
                "fat": 6.9,
                "created_at": "2024-06-01T00:00:00Z",
                "updated_at": "2024-06-01T00:00:00Z"
            }}]"#,
            Uuid::new_v4()
        );
        kv.set(keys::PRODUCTS_V1, &json).await.unwrap();

        let products = load_products(&store).await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].calories, 389.0);
        assert_eq!(products[0].per_amount, 100.0);
        assert_eq!(products[0].per_unit, Unit::G);
    }
}
