//! Property tests for cache key normalization.

use std::path::Component;

use projcache_core::CacheKey;
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-z]{1,8}",
        1 => Just(".".to_string()),
        1 => Just("..".to_string()),
    ]
}

proptest! {
    #[test]
    fn normalized_keys_have_no_dot_segments(segments in prop::collection::vec(segment(), 1..12)) {
        let raw = format!("/{}", segments.join("/"));
        let key = CacheKey::new(&raw).unwrap();
        prop_assert!(key.as_path().is_absolute());
        for component in key.as_path().components() {
            prop_assert!(!matches!(component, Component::CurDir | Component::ParentDir));
        }
    }

    #[test]
    fn normalization_is_idempotent(segments in prop::collection::vec(segment(), 1..12)) {
        let raw = format!("/{}", segments.join("/"));
        let once = CacheKey::new(&raw).unwrap();
        let twice = CacheKey::new(once.as_path()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn inserting_a_dot_segment_changes_nothing(segments in prop::collection::vec("[a-z]{1,8}", 1..8), at in 0usize..8) {
        let plain = format!("/{}", segments.join("/"));
        let mut dotted = segments.clone();
        dotted.insert(at.min(segments.len()), ".".to_string());
        let dotted = format!("/{}", dotted.join("/"));
        prop_assert_eq!(CacheKey::new(&plain).unwrap(), CacheKey::new(&dotted).unwrap());
    }
}
