//! Document parse errors.

use super::error_code::{self, CacheErrorCode};

/// Errors produced while turning bytes into a raw document, a parser or a project.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Malformed document at byte {position}: {message}")]
    Malformed { message: String, position: u64 },

    #[error("Document has no root element")]
    NoRootElement,

    /// Content is well-formed but a parser collaborator refused it.
    #[error("Document rejected: {message}")]
    Rejected { message: String },
}

impl ParseError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

impl CacheErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => error_code::PARSE_MALFORMED,
            Self::NoRootElement => error_code::PARSE_NO_ROOT,
            Self::Rejected { .. } => error_code::PARSE_REJECTED,
        }
    }
}
