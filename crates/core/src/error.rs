//! Error types for the typeahead service.
//!
//! One unified error enum is used across the store, the snapshot layer, and
//! the HTTP surface. We use `thiserror` for the `Display` and `Error` trait
//! implementations. Mapping to HTTP status codes lives in the server crate,
//! not here.

use std::io;
use thiserror::Error;

/// Result type alias for typeahead operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the typeahead service
#[derive(Debug, Error)]
pub enum Error {
    /// A mandatory request argument was absent
    #[error("missing required argument: {0}")]
    MissingRequiredArg(&'static str),

    /// Input that could not be normalized: invalid locale tag, embedded NUL
    #[error("bad input: {0}")]
    BadInput(String),

    /// Namespace does not exist (reported by the increment path only;
    /// `delete` and `nuke` treat an absent namespace as a no-op)
    #[error("namespace not found: {0}")]
    NamespaceNotFound(String),

    /// Key does not exist (reported by the increment path only)
    #[error("key not found")]
    KeyNotFound,

    /// A snapshot file failed to decode
    #[error("corrupt snapshot: {0}")]
    Corruption(String),

    /// I/O error (snapshot read/write, socket setup)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Build a `BadInput` error from any displayable message.
    pub fn bad_input(msg: impl Into<String>) -> Self {
        Error::BadInput(msg.into())
    }

    /// Build a `Corruption` error from any displayable message.
    pub fn corruption(msg: impl Into<String>) -> Self {
        Error::Corruption(msg.into())
    }

    /// True for the two lookup-miss variants used by the increment path.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NamespaceNotFound(_) | Error::KeyNotFound)
    }

    /// True when the client sent a request we refuse to act on, as opposed
    /// to an internal failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MissingRequiredArg(_) | Error::BadInput(_)
        ) || self.is_not_found()
    }
}
