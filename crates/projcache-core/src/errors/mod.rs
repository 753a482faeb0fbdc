//! Error types, one enum per concern, each mapped to a stable error code.

pub mod config_error;
pub mod error_code;
pub mod load_error;
pub mod parse_error;
pub mod storage_error;
pub mod watch_error;

pub use config_error::ConfigError;
pub use load_error::LoadError;
pub use parse_error::ParseError;
pub use storage_error::StorageError;
pub use watch_error::WatchError;
