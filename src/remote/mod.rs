//! Remote resource client for the CountOnMe API.
//!
//! One async function per (resource, action) pair, behind the [`RemoteApi`]
//! trait so the sync queue and repositories can be exercised against mocks.

mod api;
mod error;
mod http;

#[cfg(test)]
pub(crate) mod mock;

pub use api::{
    BodyWeightCreate, BodyWeightPatch, FoodEntryCreate, FoodEntryPatch, GoalCreate, GoalPatch,
    MealCreate, MealPatch, PortionCreate, ProductCreate, ProductPatch, RemoteApi,
};
pub use error::ApiError;
pub use http::{check_server, HttpApi};
