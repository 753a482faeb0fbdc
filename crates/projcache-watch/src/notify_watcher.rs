//! `notify`-backed path watcher with native and polling backends.

use std::path::Path;
use std::sync::Mutex;

use crossbeam_channel::{unbounded, Receiver, Sender};
use notify::{Config, Event, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use projcache_core::config::{WatchBackend, WatchConfig};
use projcache_core::errors::WatchError;
use projcache_core::{CacheKey, PathWatcher};

use crate::event::{ChangeEvent, ChangeKind};

enum Backend {
    Native(RecommendedWatcher),
    Poll(PollWatcher),
}

impl Backend {
    fn watch(&mut self, path: &Path) -> notify::Result<()> {
        match self {
            Self::Native(w) => w.watch(path, RecursiveMode::NonRecursive),
            Self::Poll(w) => w.watch(path, RecursiveMode::NonRecursive),
        }
    }

    fn unwatch(&mut self, path: &Path) -> notify::Result<()> {
        match self {
            Self::Native(w) => w.unwatch(path),
            Self::Poll(w) => w.unwatch(path),
        }
    }
}

/// Watches individual files. Events arrive on the receiver returned by [`NotifyWatcher::new`].
///
/// Native backends drop a watch when the file is replaced by rename; the cache
/// invalidates and unwatches on that event and registers again on next access.
pub struct NotifyWatcher {
    backend: Mutex<Backend>,
}

impl NotifyWatcher {
    pub fn new(config: &WatchConfig) -> Result<(Self, Receiver<ChangeEvent>), WatchError> {
        let (tx, rx) = unbounded();
        let handler = move |res: notify::Result<Event>| forward(res, &tx);

        let backend = match config.effective_backend() {
            WatchBackend::Native => Backend::Native(
                RecommendedWatcher::new(handler, Config::default()).map_err(backend_error)?,
            ),
            WatchBackend::Poll => {
                let poll_config = Config::default()
                    .with_poll_interval(config.effective_poll_interval())
                    .with_compare_contents(config.effective_compare_contents());
                Backend::Poll(PollWatcher::new(handler, poll_config).map_err(backend_error)?)
            }
        };

        Ok((
            Self {
                backend: Mutex::new(backend),
            },
            rx,
        ))
    }

    fn with_backend<T>(
        &self,
        key: &CacheKey,
        op: impl FnOnce(&mut Backend) -> notify::Result<T>,
    ) -> Result<T, WatchError> {
        let mut backend = self.backend.lock().map_err(|_| WatchError::Backend {
            path: key.to_string(),
            message: "watcher lock poisoned".to_string(),
        })?;
        op(&mut *backend).map_err(|e| WatchError::Backend {
            path: key.to_string(),
            message: e.to_string(),
        })
    }
}

impl PathWatcher for NotifyWatcher {
    fn watch(&self, key: &CacheKey) -> Result<(), WatchError> {
        self.with_backend(key, |b| b.watch(key.as_path()))?;
        tracing::debug!(path = %key, "watching");
        Ok(())
    }

    fn unwatch(&self, key: &CacheKey) -> Result<(), WatchError> {
        self.with_backend(key, |b| match b.unwatch(key.as_path()) {
            // The backend already dropped it (file removed or replaced).
            Err(e) if matches!(e.kind, notify::ErrorKind::WatchNotFound) => Ok(()),
            other => other,
        })?;
        tracing::debug!(path = %key, "unwatched");
        Ok(())
    }
}

fn forward(res: notify::Result<Event>, tx: &Sender<ChangeEvent>) {
    match res {
        Ok(event) => {
            let Some(kind) = ChangeKind::from_notify(&event.kind) else {
                return;
            };
            for path in event.paths {
                // Receiver gone means the cache shut down; nothing left to notify.
                let _ = tx.send(ChangeEvent { path, kind });
            }
        }
        Err(e) => tracing::warn!(error = %e, "watch backend reported an error"),
    }
}

fn backend_error(e: notify::Error) -> WatchError {
    WatchError::Backend {
        path: e
            .paths
            .first()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        message: e.to_string(),
    }
}
