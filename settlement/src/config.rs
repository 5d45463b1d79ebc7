//! Configuration for settlement engine

use crate::types::MatchOrder;
use serde::{Deserialize, Serialize};

/// Settlement engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Ledger (tolerance) configuration
    #[serde(default)]
    pub ledger: ledger_core::Config,

    /// Netting configuration
    #[serde(default)]
    pub netting: NettingConfig,
}

/// Netting configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NettingConfig {
    /// Order in which debtors and creditors are matched
    #[serde(default)]
    pub order: MatchOrder,

    /// Fail instead of returning a partial plan when balances don't sum to zero
    #[serde(default)]
    pub reject_unbalanced: bool,
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config {
            ledger: ledger_core::Config::from_env()?,
            ..Default::default()
        };

        if let Ok(order) = std::env::var("SETTLEMENT_MATCH_ORDER") {
            config.netting.order = order.parse()?;
        }

        if let Ok(reject) = std::env::var("SETTLEMENT_REJECT_UNBALANCED") {
            config.netting.reject_unbalanced = reject.parse().map_err(|e| {
                crate::Error::Config(format!(
                    "Invalid SETTLEMENT_REJECT_UNBALANCED {:?}: {}",
                    reject, e
                ))
            })?;
        }

        Ok(config)
    }
}
