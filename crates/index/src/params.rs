//! Typed parameter descriptors for extensions.
//!
//! Extensions declare their parameters once as [`ParamSpec`]s; user input is
//! checked against those declarations by [`Params::validate`] before any hook
//! runs, so extensions only ever see known keys with legal values.

use crate::error::{ErrorKind, Result};
use std::collections::BTreeMap;

/// Declaration of one extension parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Value used when the parameter is not passed.
    pub default: Option<&'static str>,
    /// Enumerated `(value, description)` pairs; `None` accepts anything.
    pub values: Option<&'static [(&'static str, &'static str)]>,
}

impl ParamSpec {
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self { name, description, default: None, values: None }
    }

    pub const fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn with_values(mut self, values: &'static [(&'static str, &'static str)]) -> Self {
        self.values = Some(values);
        self
    }

    fn accepts(&self, value: &str) -> bool {
        match self.values {
            Some(values) => values.iter().any(|(allowed, _)| *allowed == value),
            None => true,
        }
    }
}

/// Validated parameter values, defaults filled in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, String>,
}

impl Params {
    /// Check raw `key → value` pairs against `specs`.
    ///
    /// Unknown keys and values outside an enumerated set are rejected.
    /// A key passed without a value (empty string) is accepted as a flag.
    pub fn validate<K, V>(raw: impl IntoIterator<Item = (K, V)>, specs: &[ParamSpec]) -> Result<Self>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut values = BTreeMap::new();
        for (key, value) in raw {
            let (key, value) = (key.into(), value.into());
            let Some(spec) = specs.iter().find(|spec| spec.name == key) else {
                exn::bail!(ErrorKind::UnknownParameter(key));
            };
            if !spec.accepts(&value) {
                let allowed = spec.values.unwrap_or_default().iter().map(|(v, _)| *v).collect::<Vec<_>>().join(", ");
                exn::bail!(ErrorKind::InvalidParameter { name: key, value, allowed });
            }
            values.insert(key, value);
        }
        for spec in specs {
            if let Some(default) = spec.default {
                values.entry(spec.name.to_string()).or_insert_with(|| default.to_string());
            }
        }
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
