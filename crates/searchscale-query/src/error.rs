//! Error types for query execution and signal extraction.

use thiserror::Error;

/// Result type alias for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Classification reported to the scaling control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-supplied configuration is malformed. Not worth retrying.
    InvalidArgument,
    /// The value path does not exist in an otherwise good response.
    NotFound,
    /// Upstream failure or unusable payload. May succeed on a later poll.
    Internal,
}

/// Errors that can occur while executing a search template.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid parameter format: {pair:?}")]
    MalformedInput { pair: String },

    #[error("value location must not be empty")]
    EmptyPath,

    #[error("value not found for key: {key}")]
    PathNotFound { key: String },

    #[error("value at {path} is not numeric (found {found})")]
    TypeMismatch { path: String, found: &'static str },

    #[error("failed to serialize search request: {0}")]
    Serialize(String),

    #[error("failed to build http client: {0}")]
    Client(String),

    #[error("document store unreachable: {0}")]
    Unreachable(String),

    #[error("document store rejected query with status {status}")]
    Rejected { status: u16 },

    #[error("malformed document store response: {0}")]
    MalformedResponse(String),
}

impl QueryError {
    /// The taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::MalformedInput { .. } | QueryError::EmptyPath => ErrorKind::InvalidArgument,
            QueryError::PathNotFound { .. } => ErrorKind::NotFound,
            QueryError::TypeMismatch { .. }
            | QueryError::Serialize(_)
            | QueryError::Client(_)
            | QueryError::Unreachable(_)
            | QueryError::Rejected { .. }
            | QueryError::MalformedResponse(_) => ErrorKind::Internal,
        }
    }
}
