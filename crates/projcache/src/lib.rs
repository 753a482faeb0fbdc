//! # projcache
//!
//! Bounded, filesystem-coherent cache of configuration artifacts.
//!
//! Three independent LRU tiers keyed by normalized path:
//! raw XML documents, derived protocol parsers, and parsed projects.
//! A change notification for a path evicts it from every tier and drops its
//! watch; the next access reloads and registers it again.

pub mod cache;
pub mod error;
pub mod fingerprint;
pub mod stats;
pub mod storage;
pub mod watched;

mod registry;
mod tier;

pub use cache::{ConfigCache, ConfigCacheBuilder};
pub use error::StartError;
pub use fingerprint::protocol_fingerprint;
pub use stats::{CacheStatsSnapshot, TierStatsSnapshot};
pub use storage::FsStorage;
pub use watched::WatchedConfigCache;
