//! Tier identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three independently bounded caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    RawDocuments,
    ProtocolParsers,
    Projects,
}

impl TierKind {
    pub const ALL: [TierKind; 3] = [Self::RawDocuments, Self::ProtocolParsers, Self::Projects];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RawDocuments => "raw_documents",
            Self::ProtocolParsers => "protocol_parsers",
            Self::Projects => "projects",
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
