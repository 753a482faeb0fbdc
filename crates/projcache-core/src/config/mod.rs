//! Cache configuration, loaded from TOML.

pub mod protocol_config;
pub mod storage_config;
pub mod tier_config;
pub mod watch_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub use protocol_config::{ProtocolConfig, ProtocolKeying};
pub use storage_config::StorageConfig;
pub use tier_config::TierConfig;
pub use watch_config::{WatchBackend, WatchConfig};

/// Top-level configuration for a `ConfigCache`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CacheConfig {
    /// Raw XML document tier.
    pub raw_documents: TierConfig,
    /// Derived protocol parser tier.
    pub protocol_parsers: TierConfig,
    /// Parsed project tier.
    pub projects: TierConfig,
    pub protocol: ProtocolConfig,
    pub watch: WatchConfig,
    pub storage: StorageConfig,
}

impl CacheConfig {
    /// Parse and validate a TOML configuration string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        ::tracing::debug!(path = %path.display(), "loaded cache configuration");
        Ok(config)
    }

    /// Reject values the cache cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.raw_documents.validate("raw_documents")?;
        self.protocol_parsers.validate("protocol_parsers")?;
        self.projects.validate("projects")?;
        self.watch.validate()?;
        self.storage.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_MAX_ENTRIES;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = CacheConfig::from_toml("").unwrap();
        assert_eq!(config.projects.effective_max_entries(), DEFAULT_MAX_ENTRIES);
        assert_eq!(config.protocol.effective_keying(), ProtocolKeying::PathAndParameters);
        assert!(config.watch.effective_enabled());
        assert!(config.watch.effective_compare_contents());
        assert!(!config.storage.effective_remember_failures());
    }

    #[test]
    fn full_toml_round_trips_values() {
        let config = CacheConfig::from_toml(
            r#"
            [raw_documents]
            max_entries = 4096
            weigh_by_size = true

            [projects]
            max_entries = 2

            [protocol]
            keying = "path_only"

            [watch]
            backend = "poll"
            poll_interval_ms = 50
            compare_contents = false

            [storage]
            max_file_size = 1024
            resolve_symlinks = true
            remember_failures = true
            "#,
        )
        .unwrap();

        assert_eq!(config.raw_documents.effective_max_entries(), 4096);
        assert!(config.raw_documents.effective_weigh_by_size());
        assert_eq!(config.projects.effective_max_entries(), 2);
        assert_eq!(config.protocol_parsers.effective_max_entries(), DEFAULT_MAX_ENTRIES);
        assert_eq!(config.protocol.effective_keying(), ProtocolKeying::PathOnly);
        assert_eq!(config.watch.effective_backend(), WatchBackend::Poll);
        assert_eq!(config.watch.effective_poll_interval().as_millis(), 50);
        assert!(!config.watch.effective_compare_contents());
        assert_eq!(config.storage.effective_max_file_size(), 1024);
        assert!(config.storage.effective_resolve_symlinks());
        assert!(config.storage.effective_remember_failures());
    }

    #[test]
    fn zero_capacity_rejected() {
        let err = CacheConfig::from_toml("[projects]\nmax_entries = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "projects.max_entries"));
    }

    #[test]
    fn unknown_keying_is_a_parse_error() {
        let err = CacheConfig::from_toml("[protocol]\nkeying = \"by_moon_phase\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projcache.toml");
        std::fs::write(&path, "[watch]\nenabled = false\n").unwrap();
        let config = CacheConfig::load(&path).unwrap();
        assert!(!config.watch.effective_enabled());

        let missing = CacheConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io(_)));
    }
}
