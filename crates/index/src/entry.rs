use crate::Action;
use derive_more::Display;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Identifier of an [`Entry`], assigned by the owning
/// [`FileIndex`](crate::FileIndex) in increasing order and never reused.
///
/// Rendered as eight zero-padded decimal digits.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display("{_0:08}")]
pub struct EntryId(u64);

impl EntryId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl FromStr for EntryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// A pending `(path, action)` pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub path: PathBuf,
    pub action: Action,
}

impl Target {
    pub fn new(path: impl Into<PathBuf>, action: Action) -> Self {
        Self { path: path.into(), action }
    }
}

/// Free-form key/value annotations of an entry.
///
/// Remembers the values it was loaded with, so changes made in the plan can
/// be detected with [`is_modified()`](Self::is_modified).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    values: BTreeMap<String, String>,
    loaded: BTreeMap<String, String>,
}

impl Metadata {
    /// Replace every value and take a new snapshot.
    pub fn load(&mut self, values: impl IntoIterator<Item = (String, String)>) {
        self.values = values.into_iter().collect();
        self.loaded = self.values.clone();
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether any value differs from the last [`load()`](Self::load).
    pub fn is_modified(&self) -> bool {
        self.values != self.loaded
    }
}

/// One file known to the index.
///
/// An entry with no pending targets is resolved and will be removed by the
/// next [`purge()`](crate::FileIndex::purge).
#[derive(Clone, Debug)]
pub struct Entry {
    id: EntryId,
    current_name: PathBuf,
    targets: Vec<Target>,
    remarks: Vec<String>,
    group: Option<String>,
    metadata: Metadata,
}

impl Entry {
    /// A fresh entry has exactly one pending pair: itself with `action`.
    pub(crate) fn new(id: EntryId, path: PathBuf, action: Action) -> Self {
        Self {
            id,
            targets: vec![Target::new(path.clone(), action)],
            current_name: path,
            remarks: Vec::new(),
            group: None,
            metadata: Metadata::default(),
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn current_name(&self) -> &Path {
        &self.current_name
    }

    pub fn set_current_name(&mut self, path: impl Into<PathBuf>) {
        self.current_name = path.into();
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn add_target(&mut self, path: impl Into<PathBuf>, action: Action) {
        self.targets.push(Target::new(path, action));
    }

    pub fn set_targets(&mut self, targets: Vec<Target>) {
        self.targets = targets;
    }

    pub fn take_targets(&mut self) -> Vec<Target> {
        std::mem::take(&mut self.targets)
    }

    pub fn is_resolved(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn remarks(&self) -> &[String] {
        &self.remarks
    }

    pub fn add_remark(&mut self, remark: impl Into<String>) {
        self.remarks.push(remark.into());
    }

    /// Forget every pending target and remark, ahead of re-reading them from
    /// an edited plan.
    pub fn reset(&mut self) {
        self.targets.clear();
        self.remarks.clear();
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Set the group of a detached entry. The group becomes visible in the
    /// index registry once the entry is [committed](crate::FileIndex::commit).
    pub fn assign_to_group(&mut self, group: impl Into<String>) {
        self.group = Some(group.into());
    }

    pub fn ungroup(&mut self) {
        self.group = None;
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
