//! CountOnMe client library.
//!
//! Offline-first synchronization engine for a personal nutrition tracker:
//! local-first repositories over a durable key-value store, a FIFO sync
//! outbox with retry and backoff, and a remote-first food log against the
//! CountOnMe HTTP API.

pub mod commands;
pub mod config;
pub mod device;
pub mod models;
pub mod remote;
pub mod repo;
pub mod store;
pub mod sync;

pub use config::{Config, ConfigError, ConfigSource, ConfigValue, SyncConfig};
pub use device::DeviceIdentity;
pub use models::{
    BodyWeightEntry, FoodEntry, Meal, MealItem, MealType, Portion, Product, Unit, UserGoal,
};
pub use remote::{ApiError, HttpApi, RemoteApi};
pub use repo::{
    FoodLog, GoalRepository, MealRepository, NewGoal, NewMeal, NewProduct, ProductRepository,
    RepoError, WeightRepository,
};
pub use store::{keys, CollectionStore, FileStore, KeyValueStore, MemoryStore, StoreError};
pub use sync::{
    Connectivity, FlushReport, NetworkMonitor, SyncQueue, SyncStatus, SyncStatusReporter,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
