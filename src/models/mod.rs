//! Domain models shared across the local store, repositories, and remote client.

mod food_entry;
mod goal;
mod meal;
mod meal_type;
mod number;
mod product;
mod unit;
mod weight;

pub use food_entry::{FoodEntry, Portion};
pub use goal::UserGoal;
pub use meal::{Meal, MealItem};
pub use meal_type::MealType;
pub use number::lenient_f64;
pub use product::Product;
pub use unit::Unit;
pub use weight::BodyWeightEntry;
