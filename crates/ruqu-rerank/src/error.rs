//! Error types for the ruqu-rerank engine

use crate::types::DocumentId;
use thiserror::Error;

/// Errors that can occur while projecting, encoding, storing or reranking.
///
/// Dimension and projection errors mean the loaded artifacts and the running
/// code disagree; they are never retried. `NotFound` is the only variant the
/// reranker recovers from locally.
#[derive(Error, Debug)]
pub enum RerankError {
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid projection: {0}")]
    InvalidProjection(String),

    #[error("invalid configuration value for `{field}`: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("qubit limit exceeded: requested {requested}, maximum {maximum}")]
    QubitLimitExceeded { requested: usize, maximum: usize },

    #[error("document not found: {0}")]
    NotFound(DocumentId),

    #[error("duplicate document id: {0}")]
    DuplicateDocument(DocumentId),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

impl RerankError {
    /// Create a dimension mismatch error
    pub fn dimension(context: &'static str, expected: usize, actual: usize) -> Self {
        RerankError::DimensionMismatch {
            context,
            expected,
            actual,
        }
    }

    /// Create an invalid projection error
    pub fn projection<S: Into<String>>(msg: S) -> Self {
        RerankError::InvalidProjection(msg.into())
    }

    /// Create an invalid configuration error
    pub fn config<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        RerankError::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        RerankError::InvalidArgument(msg.into())
    }

    /// Create a provider error
    pub fn provider<S: Into<String>>(msg: S) -> Self {
        RerankError::Provider(msg.into())
    }

    /// `true` for errors caused by artifacts that disagree with each other
    /// (wrong dimensions, corrupt projection). These are fatal for the call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RerankError::DimensionMismatch { .. }
                | RerankError::InvalidProjection(_)
                | RerankError::InvalidConfig { .. }
                | RerankError::QubitLimitExceeded { .. }
        )
    }
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, RerankError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_message() {
        let err = RerankError::dimension("embedding", 384, 768);
        assert_eq!(
            err.to_string(),
            "dimension mismatch in embedding: expected 384, got 768"
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn test_not_found_is_not_configuration() {
        let err = RerankError::NotFound("doc-7".to_string());
        assert!(!err.is_configuration());
        assert_eq!(err.to_string(), "document not found: doc-7");
    }
}
