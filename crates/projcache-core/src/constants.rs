//! Defaults shared across the workspace.

/// Default per-tier entry bound.
pub const DEFAULT_MAX_ENTRIES: u64 = 100;

/// Default maximum size of a configuration file read from storage (16 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Default polling interval for the polling watch backend.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV: &str = "PROJCACHE_LOG";

/// Filter used when `PROJCACHE_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "projcache=info,projcache_watch=info";
