//! Extension Registry Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Parameter validation failures keep
//! the index crate's error as a child frame.

use derive_more::{Display, Error};

/// An extension selection error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extension selection.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum ErrorKind {
    /// The selector did not name an extension.
    #[display("no extension name given in \"{_0}\"")]
    MissingName(#[error(not(source))] String),
    #[display("no such extension: {_0}")]
    UnknownExtension(#[error(not(source))] String),
    /// The extension rejected its parameters.
    #[display("invalid parameters for extension \"{_0}\"")]
    InvalidParameters(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
