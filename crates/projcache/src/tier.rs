//! One bounded LRU tier over `moka::sync::Cache`.

use std::hash::Hash;
use std::sync::Arc;

use crossbeam_channel::Sender;
use moka::notification::RemovalCause;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use projcache_core::config::TierConfig;
use projcache_core::{CacheKey, CacheWeight, TierKind};

/// Protocol tier key. `variant` is the parameter fingerprint, or a constant
/// when protocol parsers are keyed by path only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ProtocolKey {
    pub path: CacheKey,
    pub variant: u64,
}

impl ProtocolKey {
    pub fn new(path: CacheKey, variant: u64) -> Self {
        Self { path, variant }
    }
}

/// A capacity eviction, reported from moka's eviction listener.
#[derive(Debug, Clone)]
pub(crate) enum EvictionNotice {
    RawDocument(CacheKey),
    ProtocolParser(ProtocolKey),
    Project(CacheKey),
}

impl EvictionNotice {
    pub fn tier(&self) -> TierKind {
        match self {
            Self::RawDocument(_) => TierKind::RawDocuments,
            Self::ProtocolParser(_) => TierKind::ProtocolParsers,
            Self::Project(_) => TierKind::Projects,
        }
    }

    pub fn path(&self) -> &CacheKey {
        match self {
            Self::RawDocument(k) | Self::Project(k) => k,
            Self::ProtocolParser(k) => &k.path,
        }
    }
}

/// Values storable in a tier.
pub(crate) trait TierValue: Clone + Send + Sync + 'static {
    fn weight(&self) -> u32;
}

impl<T: CacheWeight + Send + Sync + 'static> TierValue for Arc<T> {
    fn weight(&self) -> u32 {
        (**self).cache_weight()
    }
}

pub(crate) struct Tier<K, V> {
    kind: TierKind,
    inner: Cache<K, V>,
}

impl<K, V> Tier<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: TierValue,
{
    /// Build a tier bounded by `config`. Capacity evictions are pushed, never
    /// blocking, onto `evictions`; explicit invalidations and replacements are not.
    pub fn new(
        kind: TierKind,
        config: &TierConfig,
        evictions: Sender<EvictionNotice>,
        notice: fn(&K) -> EvictionNotice,
    ) -> Self {
        let mut builder = Cache::builder()
            .name(kind.as_str())
            .max_capacity(config.effective_max_entries())
            .eviction_policy(EvictionPolicy::lru())
            .eviction_listener(move |key: Arc<K>, _value: V, cause: RemovalCause| {
                if cause.was_evicted() {
                    let _ = evictions.send(notice(&key));
                }
            });
        if config.effective_weigh_by_size() {
            builder = builder.weigher(|_key: &K, value: &V| value.weight());
        }
        Self {
            kind,
            inner: builder.build(),
        }
    }

    pub fn kind(&self) -> TierKind {
        self.kind
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key)
    }

    /// Insert and run maintenance at once, so the bound holds and the
    /// LRU victim is chosen before the caller releases the registry lock.
    pub fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value);
        self.inner.run_pending_tasks();
    }

    pub fn invalidate(&self, key: &K) {
        self.inner.invalidate(key);
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}
