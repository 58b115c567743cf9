//! Extension capability trait and the ordered pipeline of configured
//! extensions.
//!
//! Every hook has a no-op default, so an extension only implements the
//! capabilities it needs. Hooks are synchronous: the expensive ones
//! ([`after_file_added`](Extension::after_file_added)) are moved onto the
//! blocking thread pool by the [`Pipeline`].

use crate::error::Result;
use crate::{Entry, FileIndex, ParamSpec, Params};
use std::path::Path;
use std::sync::Arc;

/// A content-analysis module hooked into the index lifecycle.
pub trait Extension: Send + Sync {
    /// Short name used to select the extension on the command line.
    fn name(&self) -> &str;

    /// One-line human-readable description.
    fn description(&self) -> &str {
        ""
    }

    /// Parameters understood by [`on_params_passed`](Self::on_params_passed).
    fn params(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    /// Receive validated parameters once, before any file is added.
    fn on_params_passed(&mut self, _params: &Params) -> Result<()> {
        Ok(())
    }

    /// Pure predicate: `false` keeps the file out of the index.
    fn before_file_added(&self, _path: &Path) -> bool {
        true
    }

    /// Annotate a freshly added entry (hash it, load its metadata, ...).
    /// Runs on a worker, against a detached copy of the entry.
    fn after_file_added(&self, _entry: &mut Entry) -> Result<()> {
        Ok(())
    }

    /// Reshape the whole index once every file has been enriched.
    fn on_index_complete(&self, _index: &mut FileIndex) -> Result<()> {
        Ok(())
    }

    /// Called before the pending operations of an entry are executed. An
    /// error skips the entry's operations for this round.
    fn before_file_ops(&self, _entry: &Entry) -> Result<()> {
        Ok(())
    }

    /// Called after the pending operations of an entry were executed.
    fn after_file_ops(&self, _entry: &Entry) -> Result<()> {
        Ok(())
    }
}

/// Outcome of running every `after_file_added` hook on one entry.
#[derive(Debug)]
pub struct Enriched {
    pub entry: Entry,
    /// Number of hooks that failed (each failure left a remark on the entry).
    pub failures: usize,
}

/// Configured extensions, in command-line order. Cheap to clone.
#[derive(Clone)]
pub struct Pipeline {
    extensions: Arc<[Box<dyn Extension>]>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Pipeline {
    pub fn new(extensions: Vec<Box<dyn Extension>>) -> Self {
        Self { extensions: extensions.into() }
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Extension> {
        #[allow(clippy::borrowed_box)]
        fn unbox(extension: &Box<dyn Extension>) -> &dyn Extension {
            extension.as_ref()
        }
        self.extensions.iter().map(unbox)
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// The first extension whose `before_file_added` rejects `path`.
    pub fn veto(&self, path: &Path) -> Option<&dyn Extension> {
        self.iter().find(|extension| !extension.before_file_added(path))
    }

    /// Run every `after_file_added` hook on `entry`, in order. A failing hook
    /// is logged and recorded as a remark; the remaining hooks still run.
    pub fn enrich_blocking(&self, entry: &mut Entry) -> usize {
        let mut failures = 0;
        for extension in self.iter() {
            if let Err(err) = extension.after_file_added(entry) {
                tracing::error!(
                    extension = extension.name(),
                    path = %entry.current_name().display(),
                    error = ?err,
                    "Extension failed to process file"
                );
                entry.add_remark(format!("{}: {}", extension.name(), *err));
                failures += 1;
            }
        }
        failures
    }

    /// [`enrich_blocking`](Self::enrich_blocking) on the blocking thread pool.
    pub async fn enrich(&self, entry: Entry) -> Enriched {
        if self.is_empty() {
            return Enriched { entry, failures: 0 };
        }
        let pipeline = self.clone();
        let mut fallback = entry.clone();
        let task = tokio::task::spawn_blocking(move || {
            let mut entry = entry;
            let failures = pipeline.enrich_blocking(&mut entry);
            Enriched { entry, failures }
        });
        match task.await {
            Ok(enriched) => enriched,
            Err(err) => {
                tracing::error!(path = %fallback.current_name().display(), error = %err, "Extension hook panicked");
                fallback.add_remark(format!("processing aborted: {err}"));
                Enriched { entry: fallback, failures: 1 }
            },
        }
    }

    /// Run every `on_index_complete` hook, then purge the index.
    pub(crate) fn complete(&self, index: &mut FileIndex) {
        for extension in self.iter() {
            if let Err(err) = extension.on_index_complete(index) {
                tracing::error!(extension = extension.name(), error = ?err, "Extension failed to process the index");
            }
        }
        index.purge();
    }

    /// Run every `before_file_ops` hook, stopping at the first failure.
    pub fn before_file_ops(&self, entry: &Entry) -> Result<()> {
        self.iter().try_for_each(|extension| extension.before_file_ops(entry))
    }

    /// Run every `after_file_ops` hook, stopping at the first failure.
    pub fn after_file_ops(&self, entry: &Entry) -> Result<()> {
        self.iter().try_for_each(|extension| extension.after_file_ops(entry))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter().map(|extension| extension.name())).finish()
    }
}
