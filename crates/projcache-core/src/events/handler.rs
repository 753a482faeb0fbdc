//! Observer trait for cache lifecycle events.

use super::types::*;

/// Receives cache events. Every method defaults to a no-op, so implementors
/// override only what they need. Called inline; keep implementations cheap.
pub trait CacheEventHandler: Send + Sync {
    fn on_populated(&self, _event: &PopulatedEvent) {}
    fn on_hit(&self, _event: &HitEvent) {}
    fn on_load_failed(&self, _event: &LoadFailedEvent) {}
    fn on_invalidated(&self, _event: &InvalidatedEvent) {}
    fn on_evicted(&self, _event: &EvictedEvent) {}
}

/// Handler that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl CacheEventHandler for NoOpHandler {}
