//! Per-path bookkeeping: generations, in-flight loads, watch state and
//! protocol variants. Pure data; the cache holds it behind one mutex.

use projcache_core::CacheKey;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// State for a path that has live entries, in-flight loads, or a remembered failure.
#[derive(Debug, Default)]
pub(crate) struct PathState {
    generation: u64,
    in_flight: u32,
    pub watched: bool,
    pub failed: bool,
    /// Protocol tier variants published for this path.
    pub variants: SmallVec<[u64; 2]>,
}

impl PathState {
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }
}

/// What an invalidation found for a path.
#[derive(Debug)]
pub(crate) struct Invalidated {
    pub watched: bool,
    pub failed: bool,
    pub variants: SmallVec<[u64; 2]>,
}

#[derive(Debug, Default)]
pub(crate) struct Registry {
    paths: FxHashMap<CacheKey, PathState>,
}

impl Registry {
    /// Register a load for `key` and return its generation ticket, or `None`
    /// while a failure for `key` is remembered.
    pub fn begin(&mut self, key: &CacheKey) -> Option<u64> {
        let state = self.paths.entry(key.clone()).or_default();
        if state.failed {
            return None;
        }
        state.in_flight += 1;
        Some(state.generation)
    }

    /// End a load. Returns whether `generation` is still current, i.e. no
    /// invalidation happened since the ticket was issued.
    pub fn finish(&mut self, key: &CacheKey, generation: u64) -> bool {
        match self.paths.get_mut(key) {
            Some(state) => {
                state.in_flight = state.in_flight.saturating_sub(1);
                state.generation == generation
            }
            None => false,
        }
    }

    /// Bump the generation and forget watch, variants and failure memo.
    /// Returns `None` when the path was unknown.
    pub fn invalidate(&mut self, key: &CacheKey) -> Option<Invalidated> {
        let state = self.paths.get_mut(key)?;
        state.generation += 1;
        let found = Invalidated {
            watched: std::mem::take(&mut state.watched),
            failed: std::mem::take(&mut state.failed),
            variants: std::mem::take(&mut state.variants),
        };
        if state.is_idle() {
            self.paths.remove(key);
        }
        Some(found)
    }

    pub fn get(&self, key: &CacheKey) -> Option<&PathState> {
        self.paths.get(key)
    }

    pub fn get_mut(&mut self, key: &CacheKey) -> Option<&mut PathState> {
        self.paths.get_mut(key)
    }

    pub fn remove(&mut self, key: &CacheKey) -> Option<PathState> {
        self.paths.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.paths.keys()
    }

    pub fn watched(&self) -> impl Iterator<Item = &CacheKey> {
        self.paths
            .iter()
            .filter(|(_, state)| state.watched)
            .map(|(key, _)| key)
    }
}
