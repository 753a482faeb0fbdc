//! Collaborator seams. The cache orchestrates these; it implements none of
//! the project or protocol formats itself.

pub mod parsers;
pub mod storage;
pub mod watcher;

pub use parsers::{AccessControl, CacheWeight, ConfigParsers};
pub use storage::DocumentStorage;
pub use watcher::{ChangeSink, PathWatcher};
