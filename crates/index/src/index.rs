use crate::{Action, Entry, EntryId, Pipeline};
use ifs_storage::BackendHandle;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// How new files enter the index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexSettings {
    /// Action of the pending pair every new entry starts with.
    pub default_action: Action,
    /// Store absolute (lexically normalized) paths instead of the paths as
    /// they were discovered.
    pub absolute_paths: bool,
}

/// Everything needed to decide whether a path may enter the index, detached
/// from the index itself so it can run without holding a lock on it.
#[derive(Clone)]
pub struct Admission {
    backend: BackendHandle,
    pipeline: Pipeline,
    settings: IndexSettings,
}

impl Admission {
    /// Apply the absolute-path policy, probe the file for readability and
    /// run the `before_file_added` veto chain. Returns the path to store, or
    /// `None` if the file must be skipped (the reason has been logged).
    pub async fn admit(&self, path: &Path) -> Option<PathBuf> {
        let path = if self.settings.absolute_paths {
            match self.backend.absolute(path) {
                Ok(absolute) => absolute,
                Err(err) => {
                    tracing::warn!(path = %path.display(), "Skipping file: {}", *err);
                    return None;
                },
            }
        } else {
            path.to_path_buf()
        };
        if let Err(err) = self.backend.probe(&path).await {
            tracing::warn!(path = %path.display(), "Skipping file: {}", *err);
            return None;
        }
        if let Some(extension) = self.pipeline.veto(&path) {
            tracing::info!(path = %path.display(), extension = extension.name(), "File not added: rejected by extension");
            return None;
        }
        Some(path)
    }
}

/// Insertion-ordered collection of [`Entry`]s plus the registry of groups
/// they belong to.
///
/// Entry ids come from a counter owned by the index, so the id order is the
/// insertion order.
pub struct FileIndex {
    entries: BTreeMap<EntryId, Entry>,
    groups: Vec<String>,
    next_id: u64,
    settings: IndexSettings,
    backend: BackendHandle,
    pipeline: Pipeline,
}

impl FileIndex {
    pub fn new(backend: BackendHandle, pipeline: Pipeline, settings: IndexSettings) -> Self {
        Self {
            entries: BTreeMap::new(),
            groups: Vec::new(),
            next_id: 1,
            settings,
            backend,
            pipeline,
        }
    }

    pub fn settings(&self) -> &IndexSettings {
        &self.settings
    }

    pub fn backend(&self) -> &BackendHandle {
        &self.backend
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn admission(&self) -> Admission {
        Admission {
            backend: self.backend.clone(),
            pipeline: self.pipeline.clone(),
            settings: self.settings,
        }
    }

    /// Create an entry for an already admitted path.
    pub fn insert(&mut self, path: impl Into<PathBuf>, action: Action) -> EntryId {
        let id = EntryId::new(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, Entry::new(id, path.into(), action));
        id
    }

    /// Admit and insert a path, leaving enrichment to the caller.
    pub async fn register(&mut self, path: &Path, action: Option<Action>) -> Option<EntryId> {
        let path = self.admission().admit(path).await?;
        Some(self.insert(path, action.unwrap_or(self.settings.default_action)))
    }

    /// Admit, insert and enrich every path, returning the ids of the entries
    /// that made it into the index.
    pub async fn add<P>(&mut self, paths: impl IntoIterator<Item = P>, action: Option<Action>) -> Vec<EntryId>
    where
        P: AsRef<Path>,
    {
        let mut added = Vec::new();
        for path in paths {
            let Some(id) = self.register(path.as_ref(), action).await else {
                continue;
            };
            if let Some(entry) = self.entries.get(&id).cloned() {
                let enriched = self.pipeline.enrich(entry).await;
                self.commit(enriched.entry);
            }
            added.push(id);
        }
        added
    }

    /// Write the enrichment (group, metadata and remarks) of a detached copy
    /// back onto the stored entry. Returns `false` if the entry is gone.
    pub fn commit(&mut self, entry: Entry) -> bool {
        let Some(stored) = self.entries.get_mut(&entry.id()) else {
            return false;
        };
        let group = entry.group().map(str::to_string);
        match &group {
            Some(group) => stored.assign_to_group(group.clone()),
            None => stored.ungroup(),
        }
        *stored.metadata_mut() = entry.metadata().clone();
        for remark in entry.remarks().iter().skip(stored.remarks().len()) {
            stored.add_remark(remark.clone());
        }
        if let Some(group) = group {
            self.register_group(group);
        }
        true
    }

    pub fn remove(&mut self, id: EntryId) -> Option<Entry> {
        self.entries.remove(&id)
    }

    /// Drop resolved entries, then rebuild the group registry from the
    /// survivors (in order of first appearance).
    pub fn purge(&mut self) {
        self.entries.retain(|_, entry| !entry.is_resolved());
        let mut seen = HashSet::new();
        self.groups = self
            .entries
            .values()
            .filter_map(Entry::group)
            .filter(|group| seen.insert(*group))
            .map(str::to_string)
            .collect();
    }

    /// Run every extension's `on_index_complete` hook, then purge.
    pub fn complete(&mut self) {
        let pipeline = self.pipeline.clone();
        pipeline.complete(self);
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Add a group to the registry, if it is not there yet.
    pub fn register_group(&mut self, group: impl Into<String>) {
        let group = group.into();
        if !self.groups.contains(&group) {
            self.groups.push(group);
        }
    }

    pub fn assign_to_group(&mut self, id: EntryId, group: impl Into<String>) -> bool {
        let group = group.into();
        let Some(entry) = self.entries.get_mut(&id) else {
            return false;
        };
        entry.assign_to_group(group.clone());
        self.register_group(group);
        true
    }

    pub fn ungroup(&mut self, id: EntryId) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.ungroup();
                true
            },
            None => false,
        }
    }

    /// Entries partitioned into `(group, members)` in registry order, and
    /// the ungrouped rest, each in index order.
    pub fn files_by_group(&self) -> (Vec<(&str, Vec<&Entry>)>, Vec<&Entry>) {
        let mut members: HashMap<&str, Vec<&Entry>> = HashMap::new();
        let mut ungrouped = Vec::new();
        for entry in self.entries.values() {
            match entry.group() {
                Some(group) if self.groups.iter().any(|g| g == group) => members.entry(group).or_default().push(entry),
                _ => ungrouped.push(entry),
            }
        }
        let grouped = self
            .groups
            .iter()
            .map(|group| (group.as_str(), members.remove(group.as_str()).unwrap_or_default()))
            .collect();
        (grouped, ungrouped)
    }

    /// Number of entries that still have pending targets.
    pub fn pending_count(&self) -> usize {
        self.entries.values().filter(|entry| !entry.is_resolved()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.entries.get_mut(&id)
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn ids(&self) -> Vec<EntryId> {
        self.entries.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entry> {
        self.entries.values_mut()
    }
}

impl std::fmt::Debug for FileIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileIndex")
            .field("entries", &self.entries)
            .field("groups", &self.groups)
            .field("backend", &self.backend.name())
            .field("pipeline", &self.pipeline)
            .finish()
    }
}
