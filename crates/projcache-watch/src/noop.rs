//! Watcher for deployments that never change configuration on disk.

use projcache_core::errors::WatchError;
use projcache_core::{CacheKey, PathWatcher};

/// Accepts every registration and never reports a change.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWatcher;

impl PathWatcher for NoopWatcher {
    fn watch(&self, _key: &CacheKey) -> Result<(), WatchError> {
        Ok(())
    }

    fn unwatch(&self, _key: &CacheKey) -> Result<(), WatchError> {
        Ok(())
    }
}
