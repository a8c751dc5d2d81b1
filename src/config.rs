use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::fees::FeePolicy;
use crate::error::Result;

/// Runtime configuration for the settlement engine.
///
/// Missing fields fall back to the defaults, so a config file only needs to
/// name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    pub fees: FeePolicy,
    /// Days between shipping and the estimated delivery date.
    pub transit_days: i64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            fees: FeePolicy::default(),
            transit_days: 5,
        }
    }
}

impl SettlementConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(file)?;
        Ok(config)
    }
}
