//! Fingerprint of the caller-supplied inputs that shape a protocol parser.

use projcache_core::{AccessControl, ParameterMap};
use xxhash_rust::xxh3::Xxh3;

/// xxh3 over the access-control cache key and the ordered parameter map.
/// Every field is length-prefixed, so `{"a": "bc"}` and `{"ab": "c"}` differ.
pub fn protocol_fingerprint(access: Option<&dyn AccessControl>, params: &ParameterMap) -> u64 {
    let mut hasher = Xxh3::new();
    match access.and_then(|a| a.cache_key()) {
        Some(key) => {
            hasher.update(&[1]);
            write_field(&mut hasher, &key);
        }
        None => hasher.update(&[0]),
    }
    for (name, value) in params {
        write_field(&mut hasher, name);
        write_field(&mut hasher, value);
    }
    hasher.digest()
}

fn write_field(hasher: &mut Xxh3, field: &str) {
    hasher.update(&(field.len() as u64).to_le_bytes());
    hasher.update(field.as_bytes());
}
