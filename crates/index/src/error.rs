//! Index Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Extensions report their failures
//! through [`ErrorKind::Extension`] so the pipeline can turn them into
//! remarks.

use derive_more::{Display, Error};

/// An index error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for index and extension operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum ErrorKind {
    /// Action characters are exactly one of `r`, `d`, `c`, `l` or `i`.
    #[display("invalid action \"{_0}\" (expected one of r, d, c, l, i)")]
    InvalidAction(#[error(not(source))] String),
    /// A parameter was passed that the extension does not declare.
    #[display("unknown parameter \"{_0}\"")]
    UnknownParameter(#[error(not(source))] String),
    /// A parameter value outside of its enumerated set.
    #[display("invalid value \"{value}\" for parameter \"{name}\" (possible values: {allowed})")]
    InvalidParameter { name: String, value: String, allowed: String },
    /// A hook of an extension failed.
    #[display("{_0}")]
    Extension(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            ErrorKind::InvalidAction("x".to_string()).to_string(),
            "invalid action \"x\" (expected one of r, d, c, l, i)"
        );
        let invalid = ErrorKind::InvalidParameter {
            name: "unique".to_string(),
            value: "keep".to_string(),
            allowed: "drop, ungroup, group".to_string(),
        };
        assert_eq!(
            invalid.to_string(),
            "invalid value \"keep\" for parameter \"unique\" (possible values: drop, ungroup, group)"
        );
        assert!(!invalid.is_retryable());
    }
}
