use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("configuration file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// A source could not be read or did not match the expected shape.
    #[display("invalid configuration: {_0}")]
    Load(#[error(not(source))] String),
    #[display("invalid value \"{value}\" for \"{key}\"")]
    InvalidValue { key: &'static str, value: String },
}

impl ErrorKind {
    pub fn is_retryable(&self) -> bool {
        false
    }
}
