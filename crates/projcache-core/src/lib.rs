//! # projcache-core
//!
//! Foundation crate for the projcache configuration cache.
//! Defines keys, config, errors, collaborator traits, events, tracing setup,
//! and the XML document model the raw-document tier stores.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod tracing;
pub mod traits;
pub mod types;
pub mod xml;

// Re-export the most commonly used types at the crate root.
pub use config::CacheConfig;
pub use errors::error_code::CacheErrorCode;
pub use events::handler::CacheEventHandler;
pub use traits::{AccessControl, CacheWeight, ChangeSink, ConfigParsers, DocumentStorage, PathWatcher};
pub use types::key::CacheKey;
pub use types::tier::TierKind;
pub use types::ParameterMap;
pub use xml::{XmlDocument, XmlElement, XmlNode};
