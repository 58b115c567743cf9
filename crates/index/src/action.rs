use crate::error::{Error, ErrorKind};
use derive_more::Display;
use std::str::FromStr;

/// What should happen to a file, written as a single character in a plan.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Hash)]
pub enum Action {
    /// Rename or move the file to the target path.
    #[default]
    #[display("r")]
    Rename,
    /// Delete the file.
    #[display("d")]
    Delete,
    /// Copy the file to the target path.
    #[display("c")]
    Copy,
    /// Create a symbolic link at the target path pointing at the file.
    #[display("l")]
    Link,
    /// Leave the file alone (it stays in the index).
    #[display("i")]
    Ignore,
}

impl Action {
    pub const ALL: [Action; 5] = [Action::Rename, Action::Delete, Action::Copy, Action::Link, Action::Ignore];

    pub fn as_char(&self) -> char {
        match self {
            Self::Rename => 'r',
            Self::Delete => 'd',
            Self::Copy => 'c',
            Self::Link => 'l',
            Self::Ignore => 'i',
        }
    }

    /// Actions that produce a file at the target path.
    pub fn has_target(&self) -> bool {
        matches!(self, Self::Rename | Self::Copy | Self::Link)
    }
}

impl TryFrom<char> for Action {
    type Error = Error;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        Ok(match value {
            'r' => Self::Rename,
            'd' => Self::Delete,
            'c' => Self::Copy,
            'l' => Self::Link,
            'i' => Self::Ignore,
            other => exn::bail!(ErrorKind::InvalidAction(other.to_string())),
        })
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::try_from(c),
            _ => exn::bail!(ErrorKind::InvalidAction(s.to_string())),
        }
    }
}
