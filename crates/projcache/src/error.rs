//! Startup errors for a watched cache.

use projcache_core::errors::{ConfigError, WatchError};
use projcache_core::CacheErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Watcher error: {0}")]
    Watch(#[from] WatchError),
}

impl CacheErrorCode for StartError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Watch(e) => e.error_code(),
        }
    }
}
