//! Protocol parser keying contract.

use serde::{Deserialize, Serialize};

/// How protocol parsers are keyed.
///
/// Parsers are built from the raw document plus caller-supplied access control
/// and parameters. `PathOnly` serves the first-built parser to every caller of
/// a path and requires parameters to be process-invariant per path; a caller
/// with different parameters is logged and counted, not rebuilt.
/// `PathAndParameters` keys each distinct parameter set separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolKeying {
    PathOnly,
    #[default]
    PathAndParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Default: `path_and_parameters`.
    pub keying: Option<ProtocolKeying>,
}

impl ProtocolConfig {
    pub fn effective_keying(&self) -> ProtocolKeying {
        self.keying.unwrap_or_default()
    }
}
