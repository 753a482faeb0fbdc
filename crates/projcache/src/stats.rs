//! Hit/miss/load counters.

use std::sync::atomic::{AtomicU64, Ordering};

use projcache_core::TierKind;
use serde::Serialize;

#[derive(Debug, Default)]
pub(crate) struct TierCounters {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub loads: AtomicU64,
    pub load_failures: AtomicU64,
    pub evictions: AtomicU64,
}

impl TierCounters {
    fn snapshot(&self) -> TierStatsSnapshot {
        TierStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct CacheStats {
    raw_documents: TierCounters,
    protocol_parsers: TierCounters,
    projects: TierCounters,
    pub invalidations: AtomicU64,
    pub stale_discards: AtomicU64,
    pub parameter_mismatches: AtomicU64,
}

impl CacheStats {
    pub fn tier(&self, kind: TierKind) -> &TierCounters {
        match kind {
            TierKind::RawDocuments => &self.raw_documents,
            TierKind::ProtocolParsers => &self.protocol_parsers,
            TierKind::Projects => &self.projects,
        }
    }

    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            raw_documents: self.raw_documents.snapshot(),
            protocol_parsers: self.protocol_parsers.snapshot(),
            projects: self.projects.snapshot(),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            stale_discards: self.stale_discards.load(Ordering::Relaxed),
            parameter_mismatches: self.parameter_mismatches.load(Ordering::Relaxed),
        }
    }
}

/// Counters for one tier. `loads` counts successful read+parse, `load_failures` failed ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub loads: u64,
    pub load_failures: u64,
    pub evictions: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStatsSnapshot {
    pub raw_documents: TierStatsSnapshot,
    pub protocol_parsers: TierStatsSnapshot,
    pub projects: TierStatsSnapshot,
    pub invalidations: u64,
    /// Loads whose result was returned but not cached because the path was
    /// invalidated while they ran.
    pub stale_discards: u64,
    /// Path-only keying served a parser built with different parameters.
    pub parameter_mismatches: u64,
}

impl CacheStatsSnapshot {
    pub fn tier(&self, kind: TierKind) -> &TierStatsSnapshot {
        match kind {
            TierKind::RawDocuments => &self.raw_documents,
            TierKind::ProtocolParsers => &self.protocol_parsers,
            TierKind::Projects => &self.projects,
        }
    }
}
