//! Normalized filesystem path used as the identity of every cache entry.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::errors::StorageError;

/// A normalized absolute path. Cheap to clone.
///
/// Two spellings of the same file (`./a/../b.qgs`, `b.qgs`) map to the same key,
/// so every tier and the watch set agree on identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(Arc<Path>);

impl CacheKey {
    /// Lexically normalize `path` against the current directory.
    /// Symlinks are left alone.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let absolute = std::path::absolute(path)
            .map_err(|e| StorageError::from_io(path.display().to_string(), &e))?;
        Ok(Self(Arc::from(clean(&absolute))))
    }

    /// Canonicalize `path` when it exists, otherwise fall back to [`CacheKey::new`].
    pub fn resolved(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        match std::fs::canonicalize(path) {
            Ok(canonical) => Ok(Self(Arc::from(canonical))),
            Err(_) => Self::new(path),
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for CacheKey {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Drop `.` components and fold `..` into their parent. `..` at the root is discarded.
fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}
