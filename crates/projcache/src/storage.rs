//! Local filesystem storage.

use std::fs;

use projcache_core::config::StorageConfig;
use projcache_core::constants::DEFAULT_MAX_FILE_SIZE;
use projcache_core::errors::StorageError;
use projcache_core::{CacheKey, DocumentStorage};

/// Reads configuration files from the local filesystem, refusing oversized files.
#[derive(Debug, Clone)]
pub struct FsStorage {
    max_file_size: u64,
}

impl FsStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            max_file_size: config.effective_max_file_size(),
        }
    }
}

impl Default for FsStorage {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentStorage for FsStorage {
    fn read(&self, key: &CacheKey) -> Result<Vec<u8>, StorageError> {
        let metadata =
            fs::metadata(key.as_path()).map_err(|e| StorageError::from_io(key.to_string(), &e))?;
        if !metadata.is_file() {
            return Err(StorageError::Io {
                path: key.to_string(),
                message: "not a regular file".to_string(),
            });
        }
        if metadata.len() > self.max_file_size {
            return Err(StorageError::TooLarge {
                path: key.to_string(),
                size: metadata.len(),
                limit: self.max_file_size,
            });
        }
        fs::read(key.as_path()).map_err(|e| StorageError::from_io(key.to_string(), &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_regular_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.qgs");
        fs::write(&path, "<qgis/>").unwrap();
        let bytes = FsStorage::default().read(&CacheKey::new(&path).unwrap()).unwrap();
        assert_eq!(bytes, b"<qgis/>");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let key = CacheKey::new(dir.path().join("gone.qgs")).unwrap();
        let err = FsStorage::default().read(&key).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn oversized_file_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.qgs");
        fs::write(&path, vec![b'x'; 64]).unwrap();
        let storage = FsStorage::new(&StorageConfig {
            max_file_size: Some(16),
            ..Default::default()
        });
        let err = storage.read(&CacheKey::new(&path).unwrap()).unwrap_err();
        assert!(matches!(err, StorageError::TooLarge { size: 64, limit: 16, .. }));
    }

    #[test]
    fn directory_is_not_a_document() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsStorage::default()
            .read(&CacheKey::new(dir.path()).unwrap())
            .unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }
}
