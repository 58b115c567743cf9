//! Engine Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Failures of a single file operation are never fatal: their message
//! output becomes a remark on the entry and is shown above it in the next
//! plan. Everything else (the editor, a plan the user gave up on) ends the run.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An engine error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum ErrorKind {
    /// The destination exists and overwriting was not allowed.
    #[display(
        "Target file \"{}\" already exists. Use -o or --allow-overwriting option to force the overwrite.",
        _0.display()
    )]
    Conflict(#[error(not(source))] PathBuf),
    /// The user answered "no" to a confirmation.
    #[display("Declined: {_0}")]
    Declined(#[error(not(source))] String),
    #[display("Could not create directory \"{}\": {reason}", path.display())]
    CreateDirectory { path: PathBuf, reason: String },
    #[display("Could not create the target file {}: {reason}", path.display())]
    Transfer { path: PathBuf, reason: String },
    #[display("Could not delete \"{}\": {reason}", path.display())]
    Delete { path: PathBuf, reason: String },
    /// An extension refused to let the operations of an entry run.
    #[display("Operations skipped: {_0}")]
    Skipped(#[error(not(source))] String),
    #[display("editor \"{_0}\" not found")]
    EditorNotFound(#[error(not(source))] String),
    #[display("editor exited unsuccessfully ({_0})")]
    EditorFailed(#[error(not(source))] String),
    /// The temporary plan file could not be written or read back.
    #[display("could not exchange the plan with the editor")]
    PlanFile,
    /// The user gave up on fixing a plan that does not parse.
    #[display("invalid plan: {_0}")]
    InvalidPlan(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CreateDirectory { .. } | Self::Transfer { .. } | Self::Delete { .. })
    }
}
