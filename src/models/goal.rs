use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Daily nutrition targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserGoal {
    pub id: Uuid,
    pub daily_calories_kcal: u32,
    pub protein_percent: u8,
    pub carbs_percent: u8,
    pub fat_percent: u8,
    pub water_ml: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserGoal {
    pub fn new(
        daily_calories_kcal: u32,
        protein_percent: u8,
        carbs_percent: u8,
        fat_percent: u8,
        water_ml: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            daily_calories_kcal,
            protein_percent,
            carbs_percent,
            fat_percent,
            water_ml,
            created_at: now,
            updated_at: now,
        }
    }

    /// Grams of protein implied by the calorie target and protein share.
    pub fn protein_grams(&self) -> u32 {
        macro_grams(self.daily_calories_kcal, self.protein_percent, 4)
    }

    pub fn carbs_grams(&self) -> u32 {
        macro_grams(self.daily_calories_kcal, self.carbs_percent, 4)
    }

    pub fn fat_grams(&self) -> u32 {
        macro_grams(self.daily_calories_kcal, self.fat_percent, 9)
    }
}

fn macro_grams(calories: u32, percent: u8, kcal_per_gram: u32) -> u32 {
    (calories * percent as u32) / 100 / kcal_per_gram
}
