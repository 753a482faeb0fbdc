//! Filesystem watch configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_POLL_INTERVAL_MS;
use crate::errors::ConfigError;

/// Watch backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WatchBackend {
    /// inotify / FSEvents / ReadDirectoryChangesW.
    #[default]
    Native,
    /// mtime polling, for NFS, WSL and other filesystems without native events.
    Poll,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WatchConfig {
    /// Register cached paths for change notification. Default: true.
    pub enabled: Option<bool>,
    /// Default: native.
    pub backend: Option<WatchBackend>,
    /// Poll interval for the poll backend. Default: 500ms.
    pub poll_interval_ms: Option<u64>,
    /// Poll backend: hash file contents on every scan instead of trusting
    /// mtime alone, which notify tracks at whole-second resolution. Default: true.
    pub compare_contents: Option<bool>,
}

impl WatchConfig {
    pub fn effective_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn effective_backend(&self) -> WatchBackend {
        self.backend.unwrap_or_default()
    }

    pub fn effective_poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS))
    }

    pub fn effective_compare_contents(&self) -> bool {
        self.compare_contents.unwrap_or(true)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "watch.poll_interval_ms".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
