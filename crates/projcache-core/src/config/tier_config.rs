//! Per-tier capacity configuration.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MAX_ENTRIES;
use crate::errors::ConfigError;

/// Bound for one cache tier. Tiers never share eviction budget.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TierConfig {
    /// Maximum entry count, or total weight when `weigh_by_size` is set. Default: 100.
    pub max_entries: Option<u64>,
    /// Weigh entries by their `CacheWeight` instead of counting them. Default: false.
    pub weigh_by_size: Option<bool>,
}

impl TierConfig {
    pub fn with_max_entries(max_entries: u64) -> Self {
        Self {
            max_entries: Some(max_entries),
            ..Default::default()
        }
    }

    pub fn effective_max_entries(&self) -> u64 {
        self.max_entries.unwrap_or(DEFAULT_MAX_ENTRIES)
    }

    pub fn effective_weigh_by_size(&self) -> bool {
        self.weigh_by_size.unwrap_or(false)
    }

    pub(crate) fn validate(&self, tier: &str) -> Result<(), ConfigError> {
        if self.effective_max_entries() == 0 {
            return Err(ConfigError::InvalidValue {
                field: format!("{tier}.max_entries"),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
