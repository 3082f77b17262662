//! Defensive numeric deserialization.
//!
//! The remote API and older on-disk snapshots sometimes carry numeric fields
//! as strings. A value that is missing, empty, or unparseable deserializes to
//! `0.0` rather than failing the whole collection.

use serde::{Deserialize, Deserializer};

/// Deserializes a number that may arrive as a JSON number, a string, or null.
///
/// Invalid or empty strings parse to `0.0`, never `NaN` and never an error.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
        Null(Option<()>),
    }

    let value = match Raw::deserialize(deserializer)? {
        Raw::Num(n) if n.is_finite() => n,
        Raw::Num(_) => 0.0,
        Raw::Text(s) => {
            let parsed = s.trim().parse::<f64>().unwrap_or(0.0);
            if parsed.is_finite() {
                parsed
            } else {
                0.0
            }
        }
        Raw::Null(_) => 0.0,
    };
    Ok(value)
}
