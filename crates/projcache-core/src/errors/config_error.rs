//! Configuration loading errors.

use super::error_code::{self, CacheErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl CacheErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => error_code::CONFIG_IO,
            Self::TomlParse(_) => error_code::CONFIG_PARSE,
            Self::InvalidValue { .. } => error_code::CONFIG_INVALID,
        }
    }
}
