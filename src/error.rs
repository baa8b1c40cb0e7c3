//! Error types for catalog sessions and introspection operations.

use std::time::Duration;

use thiserror::Error;

/// Result type for session-level operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Result type for introspection operations.
pub type IntrospectResult<T> = Result<T, IntrospectError>;

/// Errors raised by a catalog session while opening, executing or closing.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The database driver reported an error.
    #[error("{0}")]
    Driver(#[from] sqlx::Error),

    /// Opening the session did not complete in time.
    #[error("connection timed out after {0:?}")]
    Timeout(Duration),

    /// The session refused the operation (used by non-driver sessions).
    #[error("{0}")]
    Rejected(String),

    /// A row could not be decoded into catalog strings.
    #[error("failed to decode catalog row: {0}")]
    Decode(String),
}

impl SessionError {
    /// Create a rejection with the given message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// The two failure kinds surfaced by the introspection core.
///
/// Both carry the underlying driver message. The transport decides how each
/// kind maps onto a response status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntrospectError {
    /// The session could not be opened.
    #[error("failed to connect to the database: {0}")]
    ConnectionFailure(String),

    /// A catalog read failed.
    #[error("failed to execute the database query: {0}")]
    QueryFailure(String),
}

/// Tag identifying an [`IntrospectError`] variant without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ConnectionFailure,
    QueryFailure,
}

impl IntrospectError {
    /// Wrap a session error raised while opening.
    pub fn connection(err: SessionError) -> Self {
        Self::ConnectionFailure(err.to_string())
    }

    /// Wrap a session error raised while reading.
    pub fn query(err: SessionError) -> Self {
        Self::QueryFailure(err.to_string())
    }

    /// The variant tag.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConnectionFailure(_) => ErrorKind::ConnectionFailure,
            Self::QueryFailure(_) => ErrorKind::QueryFailure,
        }
    }

    /// The underlying driver message.
    pub fn message(&self) -> &str {
        match self {
            Self::ConnectionFailure(msg) | Self::QueryFailure(msg) => msg,
        }
    }
}
