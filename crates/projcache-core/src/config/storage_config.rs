//! Storage and load-failure configuration.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MAX_FILE_SIZE;
use crate::errors::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Maximum file size in bytes. Default: 16 MiB.
    pub max_file_size: Option<u64>,
    /// Canonicalize existing paths when building cache keys. Default: false.
    pub resolve_symlinks: Option<bool>,
    /// Remember load failures until the path's next change notification.
    /// A remembered failure keeps the path watched. Default: false.
    pub remember_failures: Option<bool>,
}

impl StorageConfig {
    pub fn effective_max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE)
    }

    pub fn effective_resolve_symlinks(&self) -> bool {
        self.resolve_symlinks.unwrap_or(false)
    }

    pub fn effective_remember_failures(&self) -> bool {
        self.remember_failures.unwrap_or(false)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_file_size == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "storage.max_file_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
