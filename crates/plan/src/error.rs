//! Plan Error Types
//!
//! Every error produced while reading an edited plan carries the 1-based
//! line number it was found on, so it can be reported back to the user next
//! to the text they wrote.

use derive_more::{Display, Error};

/// A plan error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for plan operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum ErrorKind {
    /// A line that is neither an action line nor a metadata assignment.
    #[display("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[display("line {line}: invalid action \"{action}\" (expected one of r, d, c, l, i)")]
    InvalidAction { line: usize, action: String },
    /// A path with a malformed backslash escape.
    #[display("line {line}: invalid path: {reason}")]
    InvalidPath { line: usize, reason: String },
    /// A `key = <<END` value without its closing `<<END` line.
    #[display("line {line}: value of \"{key}\" is not terminated by <<END")]
    UnterminatedValue { line: usize, key: String },
}

impl ErrorKind {
    /// Line the problem was found on.
    pub fn line(&self) -> usize {
        match self {
            Self::Syntax { line, .. }
            | Self::InvalidAction { line, .. }
            | Self::InvalidPath { line, .. }
            | Self::UnterminatedValue { line, .. } => *line,
        }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
