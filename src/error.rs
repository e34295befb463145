//! Error types for rewrite operations

use thiserror::Error;

/// Errors that can occur before a document is rewritten
///
/// Nothing inside the tree walk produces an error: unsafe or malformed
/// content is dropped or left in place. Every variant here is raised at the
/// boundary, before parsing begins.
#[derive(Debug, Error)]
pub enum RebaseError {
    /// Origin URL is not an absolute `http`/`https` URL
    #[error("Invalid origin URL: {0}")]
    InvalidOrigin(String),
    /// Response body is not HTML
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),
    /// Response body exceeds the configured size cap
    #[error("Input of {size} bytes exceeds limit of {limit} bytes")]
    InputTooLarge { size: usize, limit: usize },
    /// Character encoding error
    #[error("Encoding error: {0}")]
    EncodingError(String),
}

impl RebaseError {
    /// HTTP-equivalent status code for the transport layer
    pub fn status_code(&self) -> u16 {
        match self {
            RebaseError::InvalidOrigin(_) => 400,
            RebaseError::InputTooLarge { .. } => 413,
            RebaseError::UnsupportedContentType(_) => 415,
            RebaseError::EncodingError(_) => 422,
        }
    }
}
