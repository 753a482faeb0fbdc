//! `ConfigCache`: three bounded tiers kept coherent with the filesystem.
//!
//! Locking: loads (storage read + parse) run outside every lock. A single
//! registry mutex covers ticket issue (with watch registration), the publish
//! step (generation check, tier insert) and the whole of every invalidation,
//! so an invalidation always wins over a load that started before it.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam_channel::{unbounded, Receiver};
use projcache_core::config::ProtocolKeying;
use projcache_core::errors::{ConfigError, LoadError, WatchError};
use projcache_core::events::handler::NoOpHandler;
use projcache_core::events::types::{
    EvictedEvent, HitEvent, InvalidatedEvent, InvalidationReason, LoadFailedEvent, PopulatedEvent,
};
use projcache_core::{
    AccessControl, CacheConfig, CacheErrorCode, CacheEventHandler, CacheKey, CacheWeight,
    ChangeSink, ConfigParsers, DocumentStorage, ParameterMap, PathWatcher, TierKind, XmlDocument,
};
use projcache_watch::NoopWatcher;

use crate::fingerprint::protocol_fingerprint;
use crate::registry::{PathState, Registry};
use crate::stats::{CacheStats, CacheStatsSnapshot};
use crate::storage::FsStorage;
use crate::tier::{EvictionNotice, ProtocolKey, Tier, TierValue};

/// Protocol tier variant used for every parser when keying by path only.
const PATH_ONLY_VARIANT: u64 = 0;

/// A cached protocol parser and the fingerprint of the inputs it was built from.
struct ProtocolEntry<T> {
    parser: Arc<T>,
    fingerprint: u64,
}

impl<T> Clone for ProtocolEntry<T> {
    fn clone(&self) -> Self {
        Self {
            parser: Arc::clone(&self.parser),
            fingerprint: self.fingerprint,
        }
    }
}

impl<T: CacheWeight + Send + Sync + 'static> TierValue for ProtocolEntry<T> {
    fn weight(&self) -> u32 {
        self.parser.cache_weight()
    }
}

/// Keyed, size-bounded cache of raw documents, protocol parsers and projects.
///
/// Construct one per serving process with [`ConfigCache::builder`] and share it
/// behind an `Arc`. Lookups populate on miss; load failures are returned as
/// `None` and are not cached.
pub struct ConfigCache<P: ConfigParsers> {
    parsers: P,
    config: CacheConfig,
    storage: Arc<dyn DocumentStorage>,
    watcher: Arc<dyn PathWatcher>,
    events: Arc<dyn CacheEventHandler>,
    raw_documents: Tier<CacheKey, Arc<XmlDocument>>,
    protocol_parsers: Tier<ProtocolKey, ProtocolEntry<P::ProtocolParser>>,
    projects: Tier<CacheKey, Arc<P::Project>>,
    registry: Mutex<Registry>,
    evictions: Receiver<EvictionNotice>,
    stats: CacheStats,
}

impl<P: ConfigParsers> ConfigCache<P> {
    pub fn builder(parsers: P) -> ConfigCacheBuilder<P> {
        ConfigCacheBuilder::new(parsers)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Shared project parser over the raw document at `path`.
    ///
    /// The raw document is cached; the parser is built from it on each call.
    pub fn project_parser(&self, path: impl AsRef<Path>) -> Option<Arc<P::ProjectParser>> {
        let key = self.key_for(path.as_ref())?;
        let document = self.raw_document(&key).ok()?;
        match self.parsers.project_parser(&document) {
            Ok(parser) => Some(Arc::new(parser)),
            Err(e) => {
                self.report_failure(TierKind::RawDocuments, &key, &LoadError::from(e));
                None
            }
        }
    }

    /// Cached protocol parser for `path`, built with `access` and `params` on miss.
    ///
    /// With `protocol.keying = "path_only"` the first parser built for a path is
    /// served to every caller until invalidation, whatever their parameters.
    pub fn protocol_parser(
        &self,
        path: impl AsRef<Path>,
        access: Option<&dyn AccessControl>,
        params: &ParameterMap,
    ) -> Option<Arc<P::ProtocolParser>> {
        let key = self.key_for(path.as_ref())?;
        self.load_protocol_parser(&key, access, params).ok()
    }

    /// Cached fully parsed project for `path`.
    pub fn project(&self, path: impl AsRef<Path>) -> Option<Arc<P::Project>> {
        let key = self.key_for(path.as_ref())?;
        self.load_project(&key).ok()
    }

    /// Drop `path` from every tier and stop watching it. A load in flight for
    /// `path` will not publish. Returns `false` when nothing was dropped.
    pub fn invalidate(&self, path: impl AsRef<Path>) -> bool {
        match self.key_for(path.as_ref()) {
            Some(key) => self.invalidate_key(&key, InvalidationReason::Explicit),
            None => false,
        }
    }

    /// Change notification for `path`. Duplicates and unknown paths are no-ops.
    pub fn on_changed(&self, path: impl AsRef<Path>) -> bool {
        match self.key_for(path.as_ref()) {
            Some(key) => self.invalidate_key(&key, InvalidationReason::Changed),
            None => false,
        }
    }

    /// Invalidate every tracked path. Returns how many held an entry, a watch
    /// or a remembered failure.
    pub fn clear(&self) -> usize {
        let keys: Vec<CacheKey> = self.lock_registry().keys().cloned().collect();
        keys.iter()
            .filter(|key| self.invalidate_key(key, InvalidationReason::Cleared))
            .count()
    }

    pub fn contains(&self, tier: TierKind, path: impl AsRef<Path>) -> bool {
        let Some(key) = self.key_for(path.as_ref()) else {
            return false;
        };
        match tier {
            TierKind::RawDocuments => self.raw_documents.contains(&key),
            TierKind::Projects => self.projects.contains(&key),
            TierKind::ProtocolParsers => {
                let registry = self.lock_registry();
                registry.get(&key).is_some_and(|state| {
                    state
                        .variants
                        .iter()
                        .any(|v| self.protocol_parsers.contains(&ProtocolKey::new(key.clone(), *v)))
                })
            }
        }
    }

    pub fn entry_count(&self, tier: TierKind) -> u64 {
        match tier {
            TierKind::RawDocuments => self.raw_documents.entry_count(),
            TierKind::ProtocolParsers => self.protocol_parsers.entry_count(),
            TierKind::Projects => self.projects.entry_count(),
        }
    }

    /// Paths currently registered with the watcher, sorted.
    pub fn watched_paths(&self) -> Vec<CacheKey> {
        let mut registry = self.lock_registry();
        let evicted = self.drain_evictions(&mut registry);
        let mut watched: Vec<CacheKey> = registry.watched().cloned().collect();
        drop(registry);
        self.announce_evictions(evicted);
        watched.sort();
        watched
    }

    pub fn is_watched(&self, path: impl AsRef<Path>) -> bool {
        let Some(key) = self.key_for(path.as_ref()) else {
            return false;
        };
        self.watched_paths().binary_search(&key).is_ok()
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    // ---- loading ----

    fn raw_document(&self, key: &CacheKey) -> Result<Arc<XmlDocument>, LoadError> {
        let tier = self.raw_documents.kind();
        if let Some(document) = self.raw_documents.get(key) {
            self.record_hit(tier, key);
            return Ok(document);
        }
        self.record_miss(tier, key);

        let guard = self.begin_load(key)?;
        let loaded = self
            .storage
            .read(key)
            .map_err(LoadError::from)
            .and_then(|bytes| XmlDocument::parse(&bytes).map_err(LoadError::from))
            .map(Arc::new);

        self.complete(guard, tier, loaded, |document, _state| {
            self.raw_documents.insert(key.clone(), Arc::clone(document));
        })
    }

    fn load_protocol_parser(
        &self,
        key: &CacheKey,
        access: Option<&dyn AccessControl>,
        params: &ParameterMap,
    ) -> Result<Arc<P::ProtocolParser>, LoadError> {
        let tier = self.protocol_parsers.kind();
        let fingerprint = protocol_fingerprint(access, params);
        let variant = match self.config.protocol.effective_keying() {
            ProtocolKeying::PathOnly => PATH_ONLY_VARIANT,
            ProtocolKeying::PathAndParameters => fingerprint,
        };
        let protocol_key = ProtocolKey::new(key.clone(), variant);

        if let Some(entry) = self.protocol_parsers.get(&protocol_key) {
            if entry.fingerprint != fingerprint {
                CacheStats::bump(&self.stats.parameter_mismatches);
                tracing::warn!(
                    path = %key,
                    "protocol parser served to a caller with different access control or \
                     parameters; keying = \"path_only\" requires them to be invariant per path"
                );
            }
            self.record_hit(tier, key);
            return Ok(entry.parser);
        }
        self.record_miss(tier, key);

        // Ticket first: a raw document fetched after an invalidation must not
        // publish a parser under the pre-invalidation generation.
        let guard = self.begin_load(key)?;
        let loaded = self.raw_document(key).and_then(|document| {
            self.parsers
                .protocol_parser(&document, access, params)
                .map(Arc::new)
                .map_err(LoadError::from)
        });

        self.complete(guard, tier, loaded, |parser, state| {
            self.protocol_parsers.insert(
                protocol_key.clone(),
                ProtocolEntry {
                    parser: Arc::clone(parser),
                    fingerprint,
                },
            );
            if !state.variants.contains(&variant) {
                state.variants.push(variant);
            }
        })
    }

    fn load_project(&self, key: &CacheKey) -> Result<Arc<P::Project>, LoadError> {
        let tier = self.projects.kind();
        if let Some(project) = self.projects.get(key) {
            self.record_hit(tier, key);
            return Ok(project);
        }
        self.record_miss(tier, key);

        let guard = self.begin_load(key)?;
        let loaded = self
            .storage
            .read(key)
            .map_err(LoadError::from)
            .and_then(|bytes| self.parsers.parse_project(key, &bytes).map_err(LoadError::from))
            .map(Arc::new);

        self.complete(guard, tier, loaded, |project, _state| {
            self.projects.insert(key.clone(), Arc::clone(project));
        })
    }

    /// Take a generation ticket for `key` and register its watch before any
    /// read, so an edit landing during the load is reported.
    fn begin_load<'a>(&'a self, key: &'a CacheKey) -> Result<LoadGuard<'a, P>, LoadError> {
        let mut registry = self.lock_registry();
        let Some(generation) = registry.begin(key) else {
            drop(registry);
            tracing::debug!(path = %key, "earlier load failure remembered; not retrying");
            return Err(LoadError::Remembered {
                path: key.to_string(),
            });
        };
        if let Err(err) = self.ensure_watched(&mut registry, key) {
            tracing::debug!(path = %key, error = %err, "watch registration failed; retrying at publish");
        }
        drop(registry);
        Ok(LoadGuard {
            cache: self,
            key,
            generation,
            finished: false,
        })
    }

    /// Publish a finished load. The loaded value is returned to the caller
    /// even when it is not cached (stale ticket or failed watch registration).
    fn complete<V>(
        &self,
        mut guard: LoadGuard<'_, P>,
        tier: TierKind,
        loaded: Result<V, LoadError>,
        publish: impl FnOnce(&V, &mut PathState),
    ) -> Result<V, LoadError> {
        let key = guard.key;
        let counters = self.stats.tier(tier);
        let mut registry = self.lock_registry();
        let current = guard.finish(&mut registry);

        let value = match loaded {
            Ok(value) => value,
            Err(err) => {
                CacheStats::bump(&counters.load_failures);
                if current
                    && self.config.storage.effective_remember_failures()
                    && !matches!(err, LoadError::Remembered { .. })
                {
                    self.remember_failure(&mut registry, key);
                }
                self.settle(&mut registry, key);
                drop(registry);
                self.report_failure(tier, key, &err);
                return Err(err);
            }
        };
        CacheStats::bump(&counters.loads);

        if !current {
            CacheStats::bump(&self.stats.stale_discards);
            self.settle(&mut registry, key);
            drop(registry);
            tracing::debug!(path = %key, tier = %tier, "invalidated during load; result not cached");
            return Ok(value);
        }

        if let Err(err) = self.ensure_watched(&mut registry, key) {
            self.settle(&mut registry, key);
            drop(registry);
            tracing::warn!(
                path = %key,
                tier = %tier,
                code = err.error_code(),
                error = %err,
                "watch registration failed; result not cached"
            );
            return Ok(value);
        }

        if let Some(state) = registry.get_mut(key) {
            publish(&value, state);
        }
        let evicted = self.drain_evictions(&mut registry);
        drop(registry);

        tracing::debug!(path = %key, tier = %tier, "cached");
        self.events.on_populated(&PopulatedEvent {
            tier,
            key: key.clone(),
        });
        self.announce_evictions(evicted);
        Ok(value)
    }

    // ---- registry maintenance (registry lock held) ----

    fn ensure_watched(&self, registry: &mut Registry, key: &CacheKey) -> Result<(), WatchError> {
        if !self.config.watch.effective_enabled() {
            return Ok(());
        }
        let Some(state) = registry.get_mut(key) else {
            return Ok(());
        };
        if !state.watched {
            self.watcher.watch(key)?;
            state.watched = true;
        }
        Ok(())
    }

    fn remember_failure(&self, registry: &mut Registry, key: &CacheKey) {
        match self.ensure_watched(registry, key) {
            Ok(()) => {
                if let Some(state) = registry.get_mut(key) {
                    state.failed = true;
                }
            }
            Err(err) => tracing::warn!(
                path = %key,
                error = %err,
                "watch registration failed; load failure not remembered"
            ),
        }
    }

    /// Forget `key` once no tier holds it, no load is in flight and no failure
    /// is remembered. Unwatches it if it was watched.
    fn settle(&self, registry: &mut Registry, key: &CacheKey) {
        let Some(state) = registry.get_mut(key) else {
            return;
        };
        state
            .variants
            .retain(|v| self.protocol_parsers.contains(&ProtocolKey::new(key.clone(), *v)));
        let live = !state.variants.is_empty()
            || self.raw_documents.contains(key)
            || self.projects.contains(key);
        if live || !state.is_idle() || state.failed {
            return;
        }
        let watched = state.watched;
        registry.remove(key);
        if watched {
            self.unwatch(key);
        }
    }

    fn drain_evictions(&self, registry: &mut Registry) -> Vec<EvictionNotice> {
        let notices: Vec<EvictionNotice> = self.evictions.try_iter().collect();
        for notice in &notices {
            self.settle(registry, notice.path());
        }
        notices
    }

    fn invalidate_key(&self, key: &CacheKey, reason: InvalidationReason) -> bool {
        let mut registry = self.lock_registry();
        let evicted = self.drain_evictions(&mut registry);
        let Some(found) = registry.invalidate(key) else {
            drop(registry);
            self.announce_evictions(evicted);
            return false;
        };
        // A path tracked only for an in-flight load has nothing to drop; its
        // generation bump alone keeps that load from publishing.
        let dropped = found.watched
            || found.failed
            || self.raw_documents.contains(key)
            || self.projects.contains(key)
            || found
                .variants
                .iter()
                .any(|v| self.protocol_parsers.contains(&ProtocolKey::new(key.clone(), *v)));
        self.raw_documents.invalidate(key);
        self.projects.invalidate(key);
        for variant in &found.variants {
            self.protocol_parsers
                .invalidate(&ProtocolKey::new(key.clone(), *variant));
        }
        if found.watched {
            self.unwatch(key);
        }
        drop(registry);

        if !dropped {
            tracing::debug!(path = %key, reason = ?reason, "load in flight invalidated");
            self.announce_evictions(evicted);
            return false;
        }
        CacheStats::bump(&self.stats.invalidations);
        tracing::info!(path = %key, reason = ?reason, "invalidated");
        self.events.on_invalidated(&InvalidatedEvent {
            key: key.clone(),
            reason,
        });
        self.announce_evictions(evicted);
        true
    }

    fn unwatch(&self, key: &CacheKey) {
        if let Err(err) = self.watcher.unwatch(key) {
            tracing::warn!(path = %key, error = %err, "unwatch failed");
        }
    }

    // ---- reporting (registry lock released) ----

    fn announce_evictions(&self, notices: Vec<EvictionNotice>) {
        for notice in notices {
            let tier = notice.tier();
            CacheStats::bump(&self.stats.tier(tier).evictions);
            tracing::debug!(path = %notice.path(), tier = %tier, "evicted");
            self.events.on_evicted(&EvictedEvent {
                tier,
                key: notice.path().clone(),
            });
        }
    }

    fn record_hit(&self, tier: TierKind, key: &CacheKey) {
        CacheStats::bump(&self.stats.tier(tier).hits);
        tracing::trace!(path = %key, tier = %tier, "hit");
        self.events.on_hit(&HitEvent {
            tier,
            key: key.clone(),
        });
    }

    fn record_miss(&self, tier: TierKind, key: &CacheKey) {
        CacheStats::bump(&self.stats.tier(tier).misses);
        tracing::debug!(path = %key, tier = %tier, "miss");
    }

    fn report_failure(&self, tier: TierKind, key: &CacheKey, err: &LoadError) {
        let code = err.error_code();
        if matches!(err, LoadError::Remembered { .. }) {
            tracing::debug!(path = %key, tier = %tier, code, "load skipped");
        } else {
            tracing::warn!(path = %key, tier = %tier, code, error = %err, "load failed; not cached");
        }
        self.events.on_load_failed(&LoadFailedEvent {
            tier,
            key: key.clone(),
            code,
            message: err.to_string(),
        });
    }

    fn key_for(&self, path: &Path) -> Option<CacheKey> {
        let key = if self.config.storage.effective_resolve_symlinks() {
            CacheKey::resolved(path)
        } else {
            CacheKey::new(path)
        };
        match key {
            Ok(key) => Some(key),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "unusable cache path");
                None
            }
        }
    }

    fn lock_registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P: ConfigParsers> ChangeSink for ConfigCache<P> {
    fn on_changed(&self, path: &Path) {
        if let Some(key) = self.key_for(path) {
            self.invalidate_key(&key, InvalidationReason::Changed);
        }
    }
}

/// An in-flight load. Dropping it unfinished (a parser panicked) still
/// releases the path's in-flight count.
struct LoadGuard<'a, P: ConfigParsers> {
    cache: &'a ConfigCache<P>,
    key: &'a CacheKey,
    generation: u64,
    finished: bool,
}

impl<P: ConfigParsers> LoadGuard<'_, P> {
    fn finish(&mut self, registry: &mut Registry) -> bool {
        self.finished = true;
        registry.finish(self.key, self.generation)
    }
}

impl<P: ConfigParsers> Drop for LoadGuard<'_, P> {
    fn drop(&mut self) {
        if !self.finished {
            let mut registry = self.cache.lock_registry();
            registry.finish(self.key, self.generation);
            self.cache.settle(&mut registry, self.key);
        }
    }
}

fn raw_notice(key: &CacheKey) -> EvictionNotice {
    EvictionNotice::RawDocument(key.clone())
}

fn protocol_notice(key: &ProtocolKey) -> EvictionNotice {
    EvictionNotice::ProtocolParser(key.clone())
}

fn project_notice(key: &CacheKey) -> EvictionNotice {
    EvictionNotice::Project(key.clone())
}

pub struct ConfigCacheBuilder<P: ConfigParsers> {
    parsers: P,
    config: CacheConfig,
    storage: Option<Arc<dyn DocumentStorage>>,
    watcher: Option<Arc<dyn PathWatcher>>,
    events: Option<Arc<dyn CacheEventHandler>>,
}

impl<P: ConfigParsers> ConfigCacheBuilder<P> {
    fn new(parsers: P) -> Self {
        Self {
            parsers,
            config: CacheConfig::default(),
            storage: None,
            watcher: None,
            events: None,
        }
    }

    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: [`FsStorage`] configured from `[storage]`.
    pub fn storage(mut self, storage: Arc<dyn DocumentStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Default: [`NoopWatcher`]. Use [`crate::WatchedConfigCache`] for a
    /// notify-backed watcher with its listener thread.
    pub fn watcher(mut self, watcher: Arc<dyn PathWatcher>) -> Self {
        self.watcher = Some(watcher);
        self
    }

    pub fn event_handler(mut self, events: Arc<dyn CacheEventHandler>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn build(self) -> Result<ConfigCache<P>, ConfigError> {
        self.config.validate()?;

        let (tx, rx) = unbounded();
        let raw_documents = Tier::new(
            TierKind::RawDocuments,
            &self.config.raw_documents,
            tx.clone(),
            raw_notice,
        );
        let protocol_parsers = Tier::new(
            TierKind::ProtocolParsers,
            &self.config.protocol_parsers,
            tx.clone(),
            protocol_notice,
        );
        let projects = Tier::new(TierKind::Projects, &self.config.projects, tx, project_notice);

        let storage: Arc<dyn DocumentStorage> = match self.storage {
            Some(storage) => storage,
            None => Arc::new(FsStorage::new(&self.config.storage)),
        };
        let watcher: Arc<dyn PathWatcher> = match self.watcher {
            Some(watcher) => watcher,
            None => Arc::new(NoopWatcher),
        };
        let events: Arc<dyn CacheEventHandler> = match self.events {
            Some(events) => events,
            None => Arc::new(NoOpHandler),
        };

        tracing::info!(
            raw_documents = self.config.raw_documents.effective_max_entries(),
            protocol_parsers = self.config.protocol_parsers.effective_max_entries(),
            projects = self.config.projects.effective_max_entries(),
            keying = ?self.config.protocol.effective_keying(),
            watch = self.config.watch.effective_enabled(),
            "config cache ready"
        );

        Ok(ConfigCache {
            parsers: self.parsers,
            config: self.config,
            storage,
            watcher,
            events,
            raw_documents,
            protocol_parsers,
            projects,
            registry: Mutex::new(Registry::default()),
            evictions: rx,
            stats: CacheStats::default(),
        })
    }
}
