//! Path-addressed byte store.

use crate::errors::StorageError;
use crate::types::key::CacheKey;

/// Reads configuration files. Implementations may block on local I/O.
pub trait DocumentStorage: Send + Sync {
    fn read(&self, key: &CacheKey) -> Result<Vec<u8>, StorageError>;
}
