//! Filesystem watch errors.

use super::error_code::{self, CacheErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Watch backend error for {path}: {message}")]
    Backend { path: String, message: String },

    #[error("Watch channel disconnected")]
    Disconnected,
}

impl CacheErrorCode for WatchError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Backend { .. } => error_code::WATCH_BACKEND,
            Self::Disconnected => error_code::WATCH_DISCONNECTED,
        }
    }
}
