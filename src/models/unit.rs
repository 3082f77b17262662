use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Measurement unit for portions, meal items, and food entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Mg,
    G,
    Kg,
    Ml,
    L,
    Tsp,
    Tbsp,
    Cup,
}

impl Unit {
    /// Returns true if the unit measures mass.
    pub fn is_mass(&self) -> bool {
        matches!(self, Unit::Mg | Unit::G | Unit::Kg)
    }

    /// Returns true if the unit measures volume.
    pub fn is_volume(&self) -> bool {
        !self.is_mass()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unit::Mg => "mg",
            Unit::G => "g",
            Unit::Kg => "kg",
            Unit::Ml => "ml",
            Unit::L => "l",
            Unit::Tsp => "tsp",
            Unit::Tbsp => "tbsp",
            Unit::Cup => "cup",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mg" => Ok(Unit::Mg),
            "g" => Ok(Unit::G),
            "kg" => Ok(Unit::Kg),
            "ml" => Ok(Unit::Ml),
            "l" => Ok(Unit::L),
            "tsp" => Ok(Unit::Tsp),
            "tbsp" => Ok(Unit::Tbsp),
            "cup" => Ok(Unit::Cup),
            other => Err(format!("Unknown unit: {}", other)),
        }
    }
}
