//! Stable error codes reported through logs and events.

pub const STORAGE_NOT_FOUND: &str = "STORAGE_NOT_FOUND";
pub const STORAGE_UNAVAILABLE: &str = "STORAGE_UNAVAILABLE";
pub const STORAGE_IO: &str = "STORAGE_IO";
pub const STORAGE_TOO_LARGE: &str = "STORAGE_TOO_LARGE";
pub const PARSE_MALFORMED: &str = "PARSE_MALFORMED";
pub const PARSE_NO_ROOT: &str = "PARSE_NO_ROOT";
pub const PARSE_REJECTED: &str = "PARSE_REJECTED";
pub const WATCH_BACKEND: &str = "WATCH_BACKEND";
pub const WATCH_DISCONNECTED: &str = "WATCH_DISCONNECTED";
pub const CONFIG_IO: &str = "CONFIG_IO";
pub const CONFIG_PARSE: &str = "CONFIG_PARSE_ERROR";
pub const CONFIG_INVALID: &str = "CONFIG_INVALID_VALUE";
pub const FAILURE_REMEMBERED: &str = "FAILURE_REMEMBERED";

/// Implemented by every error enum in the workspace.
pub trait CacheErrorCode {
    fn error_code(&self) -> &'static str;
}
