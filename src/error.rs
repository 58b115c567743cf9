use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors; each carries the message of the failure underneath.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("{_0}")]
    Config(#[error(not(source))] String),
    #[display("{_0}")]
    Extension(#[error(not(source))] String),
    #[display("{_0}")]
    Session(#[error(not(source))] String),
}

/// Raise `err` into a fatal error that shows the same message.
pub fn fatal<E>(err: exn::Exn<E>, kind: impl FnOnce(String) -> ErrorKind) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    let message = (*err).to_string();
    err.raise(kind(message))
}
