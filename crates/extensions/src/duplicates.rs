//! Content-addressed duplicate detection.
//!
//! Every file is hashed and the digest becomes its group, so identical files
//! end up next to each other in the plan. The audio-aware flavour only looks
//! at `.mp3` files and hashes their audio frames, ignoring the tags.

use derive_more::Display;
use ifs_hash::ContentRange;
use ifs_index::error::{ErrorKind, Result};
use ifs_index::{Entry, EntryId, Extension, FileIndex, ParamSpec, Params};
use std::path::Path;
use std::str::FromStr;

const UNIQUE_VALUES: &[(&str, &str)] = &[
    ("drop", "Remove them from the index, so that only duplicates will be shown"),
    (
        "ungroup",
        "Keep them in the index, but ungroup them (they will be placed in \"remaining files\" section)",
    ),
    ("group", "Keep them in the index grouped, even though they will be the only ones in the group"),
];

/// What happens to files that have no duplicate.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq)]
pub enum UniquePolicy {
    #[display("drop")]
    Drop,
    #[default]
    #[display("ungroup")]
    Ungroup,
    #[display("group")]
    Group,
}

impl FromStr for UniquePolicy {
    type Err = ifs_index::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "drop" => Self::Drop,
            "ungroup" => Self::Ungroup,
            "group" => Self::Group,
            other => exn::bail!(ErrorKind::InvalidParameter {
                name: "unique".to_string(),
                value: other.to_string(),
                allowed: "drop, ungroup, group".to_string(),
            }),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scope {
    /// Every file, hashed whole.
    AllFiles,
    /// MP3 files only, hashed by their audio frames.
    Mp3Audio,
}

/// Groups files by the SHA-224 digest of their content.
#[derive(Debug)]
pub struct DuplicateFinder {
    scope: Scope,
    unique: UniquePolicy,
}

impl DuplicateFinder {
    pub const NAME: &'static str = "df";
    pub const AUDIO_NAME: &'static str = "cadf.audio";

    /// Duplicate Finder: whole-file hashing of every file.
    pub fn new() -> Self {
        Self { scope: Scope::AllFiles, unique: UniquePolicy::default() }
    }

    /// Content-Aware Duplicate Finder for audio files.
    pub fn audio() -> Self {
        Self { scope: Scope::Mp3Audio, unique: UniquePolicy::default() }
    }

    pub fn with_unique(mut self, unique: UniquePolicy) -> Self {
        self.unique = unique;
        self
    }

    pub fn unique(&self) -> UniquePolicy {
        self.unique
    }

    fn range_for(&self, path: &Path) -> ContentRange {
        match self.scope {
            Scope::AllFiles => ContentRange::Whole,
            Scope::Mp3Audio => ContentRange::for_path(path),
        }
    }
}

impl Default for DuplicateFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl Extension for DuplicateFinder {
    fn name(&self) -> &str {
        match self.scope {
            Scope::AllFiles => Self::NAME,
            Scope::Mp3Audio => Self::AUDIO_NAME,
        }
    }

    fn description(&self) -> &str {
        match self.scope {
            Scope::AllFiles => "Groups identical files together",
            Scope::Mp3Audio => {
                "Creates groups consisting of audio files that have identical sound data, regardless of the \
                 differences in the tags. Allows to quickly find audio files which have the same content, but may \
                 be tagged differently."
            },
        }
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::new(
                "unique",
                "How the unique files (ie. files that have no duplicates) should be presented in the index",
            )
            .with_values(UNIQUE_VALUES)
            .with_default("ungroup"),
        ]
    }

    fn on_params_passed(&mut self, params: &Params) -> Result<()> {
        if let Some(unique) = params.get("unique") {
            self.unique = unique.parse()?;
        }
        Ok(())
    }

    fn before_file_added(&self, path: &Path) -> bool {
        match self.scope {
            Scope::AllFiles => true,
            Scope::Mp3Audio => ContentRange::for_path(path) == ContentRange::Mp3Audio,
        }
    }

    fn after_file_added(&self, entry: &mut Entry) -> Result<()> {
        let path = entry.current_name();
        if path.is_dir() {
            return Ok(());
        }
        let digest = ifs_hash::hash_file(path, self.range_for(path)).map_err(|err| {
            let message = format!("could not hash \"{}\": {}", path.display(), *err);
            err.raise(ErrorKind::Extension(message))
        })?;
        entry.assign_to_group(digest);
        Ok(())
    }

    fn on_index_complete(&self, index: &mut FileIndex) -> Result<()> {
        let (groups, _) = index.files_by_group();
        let singletons: Vec<EntryId> = groups
            .iter()
            .filter_map(|(_, members)| match members.as_slice() {
                [only] => Some(only.id()),
                _ => None,
            })
            .collect();
        tracing::debug!(
            extension = self.name(),
            singletons = singletons.len(),
            policy = %self.unique,
            "Resolving unique files"
        );
        for id in singletons {
            match self.unique {
                UniquePolicy::Drop => {
                    index.remove(id);
                },
                UniquePolicy::Ungroup => {
                    index.ungroup(id);
                },
                UniquePolicy::Group => {},
            }
        }
        index.purge();
        Ok(())
    }
}
