//! A `ConfigCache` wired to a `notify` watcher and its listener thread.

use std::sync::{Arc, Weak};

use projcache_core::errors::WatchError;
use projcache_core::{CacheConfig, CacheEventHandler, ChangeSink, ConfigParsers, DocumentStorage};
use projcache_watch::{InvalidationListener, NotifyWatcher};

use crate::cache::ConfigCache;
use crate::error::StartError;

/// Owns the cache and the thread that turns filesystem events into
/// invalidations. Dropping it stops the thread.
pub struct WatchedConfigCache<P: ConfigParsers> {
    cache: Arc<ConfigCache<P>>,
    listener: Option<InvalidationListener>,
}

impl<P: ConfigParsers> WatchedConfigCache<P> {
    /// Build a cache over the filesystem. With `watch.enabled = false` no
    /// watcher or thread is started and entries live until evicted or
    /// invalidated explicitly.
    pub fn start(parsers: P, config: CacheConfig) -> Result<Self, StartError> {
        Self::start_with(parsers, config, None, None)
    }

    pub fn start_with(
        parsers: P,
        config: CacheConfig,
        storage: Option<Arc<dyn DocumentStorage>>,
        events: Option<Arc<dyn CacheEventHandler>>,
    ) -> Result<Self, StartError> {
        config.validate()?;
        let watch_enabled = config.watch.effective_enabled();

        let mut builder = ConfigCache::builder(parsers);
        if let Some(storage) = storage {
            builder = builder.storage(storage);
        }
        if let Some(events) = events {
            builder = builder.event_handler(events);
        }

        if !watch_enabled {
            tracing::info!("filesystem watching disabled");
            return Ok(Self {
                cache: Arc::new(builder.config(config).build()?),
                listener: None,
            });
        }

        let (watcher, changes) = NotifyWatcher::new(&config.watch)?;
        let backend = config.watch.effective_backend();
        let cache = Arc::new(builder.config(config).watcher(Arc::new(watcher)).build()?);
        let sink: Weak<dyn ChangeSink> = Arc::downgrade(&cache) as Weak<dyn ChangeSink>;
        let listener = InvalidationListener::spawn(changes, sink)?;
        tracing::info!(backend = ?backend, "filesystem watching started");

        Ok(Self {
            cache,
            listener: Some(listener),
        })
    }

    pub fn cache(&self) -> &Arc<ConfigCache<P>> {
        &self.cache
    }

    /// Stop the listener thread. Returns the number of change events it delivered.
    pub fn shutdown(mut self) -> Result<u64, WatchError> {
        match self.listener.take() {
            Some(listener) => listener.shutdown(),
            None => Ok(0),
        }
    }
}
