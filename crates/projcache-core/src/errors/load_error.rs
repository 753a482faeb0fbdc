//! Umbrella error for a populate-on-miss attempt.

use super::error_code::{self, CacheErrorCode};
use super::{ParseError, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// An earlier failure for this path is remembered until its next change.
    #[error("Earlier load failure remembered for {path}")]
    Remembered { path: String },
}

impl CacheErrorCode for LoadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Storage(e) => e.error_code(),
            Self::Parse(e) => e.error_code(),
            Self::Remembered { .. } => error_code::FAILURE_REMEMBERED,
        }
    }
}
