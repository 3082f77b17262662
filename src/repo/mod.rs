//! Domain repositories.
//!
//! Products, meals, goals, and body weights follow the optimistic local-first
//! pattern: compute the new entity with pure sanitizers, update the in-memory
//! mirror, persist the full collection, then enqueue a sync operation whose
//! payload carries only the fields the remote call needs. Food entries invert
//! this: the remote call happens first and local state changes only on
//! success.

mod food_entries;
mod goals;
mod meals;
mod products;
mod weights;

pub use food_entries::FoodLog;
pub use goals::{GoalRepository, NewGoal};
pub use meals::{MealRepository, NewMeal};
pub use products::{NewProduct, ProductRepository};
pub use weights::WeightRepository;

use thiserror::Error;

/// Errors a local-first mutation can surface to its caller.
///
/// Remote failures are deliberately absent: they are captured into the sync
/// queue, not surfaced here.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
    #[error("Failed to encode sync payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Trims a name, falling back to a default when nothing is left.
pub(crate) fn sanitize_name(name: &str, fallback: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Clamps a numeric field to the zero floor, mapping non-finite input to 0.
pub(crate) fn clamp_non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
