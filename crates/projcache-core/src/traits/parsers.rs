//! Parser collaborators that turn cached documents into derived artifacts.

use crate::errors::ParseError;
use crate::types::key::CacheKey;
use crate::types::ParameterMap;
use crate::xml::XmlDocument;

/// Relative cost of a cached value, used when a tier weighs by size.
pub trait CacheWeight {
    fn cache_weight(&self) -> u32 {
        1
    }
}

/// Access-control context consulted when building protocol parsers.
pub trait AccessControl: Send + Sync {
    /// Identifies the effective rules. Two contexts returning the same key must
    /// produce identical parsers. `None` means no filtering.
    fn cache_key(&self) -> Option<String>;
}

/// Externally supplied parsers. All methods are pure functions of their inputs.
pub trait ConfigParsers: Send + Sync + 'static {
    type ProjectParser: Send + Sync + 'static;
    type ProtocolParser: CacheWeight + Send + Sync + 'static;
    type Project: CacheWeight + Send + Sync + 'static;

    /// Build a read-only project parser over a cached raw document.
    fn project_parser(&self, document: &XmlDocument) -> Result<Self::ProjectParser, ParseError>;

    /// Build a protocol parser; `access` and `params` shape the interpretation.
    fn protocol_parser(
        &self,
        document: &XmlDocument,
        access: Option<&dyn AccessControl>,
        params: &ParameterMap,
    ) -> Result<Self::ProtocolParser, ParseError>;

    /// Fully materialize the project stored at `key`.
    fn parse_project(&self, key: &CacheKey, bytes: &[u8]) -> Result<Self::Project, ParseError>;
}
