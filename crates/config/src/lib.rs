//! Layered settings for ifs.
//!
//! Values are merged from, in increasing precedence:
//!
//! 1. built-in defaults,
//! 2. a TOML file (`config.toml` in the platform configuration directory, or
//!    an explicitly given path),
//! 3. `IFS_`-prefixed environment variables (`IFS_MULTISTAGE=true`).
//!
//! Command-line flags are applied on top by the binary.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use ifs_index::{Action, IndexSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "IFS_";
pub const FILE_NAME: &str = "config.toml";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Action character new entries start with.
    pub default_action: String,
    pub absolute_paths: bool,
    pub include_directories: bool,
    /// Ask before every file operation.
    pub prompt: bool,
    /// Log file operations instead of performing them.
    pub simulate: bool,
    pub multistage: bool,
    pub create_directories: bool,
    pub allow_overwriting: bool,
    /// Enrichment workers; the available parallelism when unset.
    pub workers: Option<usize>,
    /// Editor command; `$EDITOR` when unset.
    pub editor: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_action: Action::default().to_string(),
            absolute_paths: false,
            include_directories: false,
            prompt: true,
            simulate: false,
            multistage: false,
            create_directories: false,
            allow_overwriting: false,
            workers: None,
            editor: None,
        }
    }
}

/// Location of the per-user configuration file.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ifs").map(|dirs| dirs.config_dir().join(FILE_NAME))
}

impl Settings {
    /// Merge defaults, the configuration file and the environment.
    ///
    /// An explicitly given file must exist; the per-user file is optional.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file = match file {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => default_path(),
        };
        let settings = Self::extract(Self::figment(file.as_deref()))?;
        tracing::debug!(file = ?file, ?settings, "Configuration loaded");
        Ok(settings)
    }

    pub fn figment(file: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        let figment = match file {
            Some(path) => figment.merge(Toml::file(path)),
            None => figment,
        };
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn extract(figment: Figment) -> Result<Self> {
        let settings: Self = figment.extract().map_err(|err| ErrorKind::Load(err.to_string()))?;
        settings.default_action()?;
        Ok(settings)
    }

    pub fn default_action(&self) -> Result<Action> {
        self.default_action.parse::<Action>().or_raise(|| ErrorKind::InvalidValue {
            key: "default_action",
            value: self.default_action.clone(),
        })
    }

    pub fn index_settings(&self) -> Result<IndexSettings> {
        Ok(IndexSettings { default_action: self.default_action()?, absolute_paths: self.absolute_paths })
    }
}
