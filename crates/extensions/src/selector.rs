use crate::error::{Error, ErrorKind};
use std::str::FromStr;

/// What an `-x` argument asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    /// Print the extension's usage.
    Help,
    /// Enable the extension with these raw `key=value` parameters.
    Configure(Vec<(String, String)>),
}

/// A parsed `name[:help|key=value key ...]` extension argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    pub name: String,
    pub request: Request,
}

impl FromStr for Selector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, rest) = match s.split_once(':') {
            Some((name, rest)) => (name.trim(), Some(rest)),
            None => (s.trim(), None),
        };
        if name.is_empty() {
            exn::bail!(ErrorKind::MissingName(s.to_string()));
        }
        let request = match rest.map(str::trim) {
            Some("help") => Request::Help,
            Some(params) => Request::Configure(
                params
                    .split_whitespace()
                    .map(|param| match param.split_once('=') {
                        Some((key, value)) => (key.to_string(), value.to_string()),
                        None => (param.to_string(), String::new()),
                    })
                    .collect(),
            ),
            None => Request::Configure(Vec::new()),
        };
        Ok(Self { name: name.to_string(), request })
    }
}
