//! Filesystem watch seams.

use std::path::Path;

use crate::errors::WatchError;
use crate::types::key::CacheKey;

/// Registers interest in individual paths.
///
/// Change notifications flow back separately, to a [`ChangeSink`].
pub trait PathWatcher: Send + Sync {
    fn watch(&self, key: &CacheKey) -> Result<(), WatchError>;

    /// Unwatching a path that is not watched must succeed.
    fn unwatch(&self, key: &CacheKey) -> Result<(), WatchError>;
}

/// Receives "path changed" notifications. Delivered at least once per change,
/// possibly more often; implementations treat duplicates as no-ops.
pub trait ChangeSink: Send + Sync {
    fn on_changed(&self, path: &Path);
}
