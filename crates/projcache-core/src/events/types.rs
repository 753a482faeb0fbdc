//! Event payloads.

use crate::types::key::CacheKey;
use crate::types::tier::TierKind;

#[derive(Debug, Clone)]
pub struct PopulatedEvent {
    pub tier: TierKind,
    pub key: CacheKey,
}

#[derive(Debug, Clone)]
pub struct HitEvent {
    pub tier: TierKind,
    pub key: CacheKey,
}

#[derive(Debug, Clone)]
pub struct LoadFailedEvent {
    pub tier: TierKind,
    pub key: CacheKey,
    pub code: &'static str,
    pub message: String,
}

/// Why a path was dropped from every tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    Explicit,
    Changed,
    Cleared,
}

#[derive(Debug, Clone)]
pub struct InvalidatedEvent {
    pub key: CacheKey,
    pub reason: InvalidationReason,
}

#[derive(Debug, Clone)]
pub struct EvictedEvent {
    pub tier: TierKind,
    pub key: CacheKey,
}
