//! Shared value types.

pub mod key;
pub mod tier;

use std::collections::BTreeMap;

/// Request parameters handed to protocol parsers. Ordered so that equal maps
/// always fingerprint the same.
pub type ParameterMap = BTreeMap<String, String>;
