//! Configuration for the group ledger

use crate::tolerance::Tolerance;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Ledger configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Settlement threshold and currency precision
    #[serde(default)]
    pub tolerance: Tolerance,
}

impl Config {
    /// Load from file. Out-of-range tolerance values fail the parse.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let defaults = Tolerance::default();
        let mut epsilon = defaults.epsilon();
        let mut scale = defaults.scale();

        if let Ok(value) = std::env::var("LEDGER_EPSILON") {
            epsilon = Decimal::from_str(&value).map_err(|e| {
                crate::Error::Config(format!("Invalid LEDGER_EPSILON {:?}: {}", value, e))
            })?;
        }

        if let Ok(value) = std::env::var("LEDGER_CURRENCY_SCALE") {
            scale = value.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid LEDGER_CURRENCY_SCALE {:?}: {}", value, e))
            })?;
        }

        Ok(Config {
            tolerance: Tolerance::new(epsilon, scale)?,
        })
    }
}
