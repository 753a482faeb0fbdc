//! Storage read errors.

use std::io;

use super::error_code::{self, CacheErrorCode};

/// Errors returned by a [`DocumentStorage`](crate::traits::DocumentStorage) read.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Not found: {path}")]
    NotFound { path: String },

    #[error("Temporarily unavailable: {path}: {message}")]
    Unavailable { path: String, message: String },

    #[error("IO error reading {path}: {message}")]
    Io { path: String, message: String },

    #[error("File too large: {path} is {size} bytes, limit {limit}")]
    TooLarge { path: String, size: u64, limit: u64 },
}

impl StorageError {
    /// Classify an `io::Error` raised while reading `path`.
    pub fn from_io(path: impl Into<String>, err: &io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut => Self::Unavailable {
                path,
                message: err.to_string(),
            },
            _ => Self::Io {
                path,
                message: err.to_string(),
            },
        }
    }
}

impl CacheErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => error_code::STORAGE_NOT_FOUND,
            Self::Unavailable { .. } => error_code::STORAGE_UNAVAILABLE,
            Self::Io { .. } => error_code::STORAGE_IO,
            Self::TooLarge { .. } => error_code::STORAGE_TOO_LARGE,
        }
    }
}
