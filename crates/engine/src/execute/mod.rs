//! Carrying out the pending operations of every entry.
//!
//! Each pair of an entry is either performed and dropped, resolved because
//! there is nothing to do, or kept pending with a remark explaining why it
//! was not performed. The remark shows up above the entry in the next plan.

mod message;

use self::message::{Transfer, confirmation};
use crate::console::Console;
use crate::error::{Error, ErrorKind, Result};
use ifs_index::{Action, Entry, FileIndex};
use ifs_storage::{BackendHandle, split_path};
use std::path::Path;
use std::sync::Arc;

/// How cautious the executor is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Ask before every operation.
    pub prompt: bool,
    /// Replace existing destination files.
    pub allow_overwriting: bool,
    /// Create missing destination directories.
    pub create_directories: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self { prompt: true, allow_overwriting: false, create_directories: false }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// Operations performed.
    pub applied: usize,
    /// Entries still holding pending pairs.
    pub pending: usize,
}

pub struct Executor<'a> {
    console: &'a dyn Console,
    options: ExecuteOptions,
}

impl<'a> Executor<'a> {
    pub fn new(console: &'a dyn Console, options: ExecuteOptions) -> Self {
        Self { console, options }
    }

    /// Perform the pending pairs of every entry in index order, then purge
    /// the resolved entries.
    #[tracing::instrument(skip_all, fields(entries = index.len()))]
    pub async fn execute(&self, index: &mut FileIndex) -> ExecutionSummary {
        let backend = Arc::clone(index.backend());
        let pipeline = index.pipeline().clone();
        let mut applied = 0;

        for id in index.ids() {
            let Some(mut entry) = index.get(id).cloned() else {
                continue;
            };
            match pipeline.before_file_ops(&entry) {
                Ok(()) => {
                    applied += self.run(&backend, &mut entry).await;
                    if let Err(err) = pipeline.after_file_ops(&entry) {
                        tracing::error!(path = %entry.current_name().display(), error = ?err, "Extension failed after file operations");
                        entry.add_remark((*err).to_string());
                    }
                },
                Err(err) => {
                    let reason = (*err).to_string();
                    self.remark(&mut entry, err.raise(ErrorKind::Skipped(reason)));
                },
            }
            if let Some(stored) = index.get_mut(id) {
                *stored = entry;
            }
        }

        index.purge();
        let summary = ExecutionSummary { applied, pending: index.len() };
        tracing::info!(applied = summary.applied, pending = summary.pending, "Operations executed");
        summary
    }

    /// Work through the pairs of one entry. Returns the number of operations
    /// performed.
    async fn run(&self, backend: &BackendHandle, entry: &mut Entry) -> usize {
        let mut applied = 0;
        let mut pending = Vec::new();
        for target in entry.take_targets() {
            let current = entry.current_name().to_path_buf();
            let result = match target.action {
                Action::Ignore => {
                    pending.push(target);
                    continue;
                },
                Action::Rename | Action::Copy | Action::Link if target.path == current => continue,
                Action::Rename => self.transfer(backend, Transfer::Move, &current, &target.path).await,
                Action::Copy => self.transfer(backend, Transfer::Copy, &current, &target.path).await,
                Action::Link => self.transfer(backend, Transfer::Link, &current, &target.path).await,
                Action::Delete => self.delete(backend, &current).await,
            };
            match result {
                Ok(()) => {
                    applied += 1;
                    if target.action == Action::Rename {
                        entry.set_current_name(target.path);
                    }
                },
                Err(err) => {
                    self.remark(entry, err);
                    pending.push(target);
                },
            }
        }
        entry.set_targets(pending);
        applied
    }

    async fn transfer(&self, backend: &BackendHandle, transfer: Transfer, current: &Path, target: &Path) -> Result<()> {
        let exists = backend.exists(target).await.map_err(|err| transfer_failed(err, target))?;
        if exists && !self.options.allow_overwriting {
            exn::bail!(ErrorKind::Conflict(target.to_path_buf()));
        }
        self.confirm(confirmation(transfer, current, target, exists)).await?;

        let (directory, _) = split_path(target);
        if self.options.create_directories
            && !directory.as_os_str().is_empty()
            && !backend.is_dir(&directory).await.unwrap_or(false)
        {
            self.confirm(format!("Target directory \"{}\" does not exist. Create it?", directory.display())).await?;
            backend.mkdir(&directory).await.map_err(|err| {
                let reason = (*err).to_string();
                err.raise(ErrorKind::CreateDirectory { path: directory.clone(), reason })
            })?;
        }

        let result = match transfer {
            Transfer::Move => backend.rename(current, target).await,
            Transfer::Copy => backend.copy(current, target).await,
            Transfer::Link => backend.link(current, target).await,
        };
        result.map_err(|err| transfer_failed(err, target))
    }

    async fn delete(&self, backend: &BackendHandle, current: &Path) -> Result<()> {
        self.confirm(format!("Delete \"{}\"?", current.display())).await?;
        backend.delete(current).await.map_err(|err| {
            let reason = (*err).to_string();
            err.raise(ErrorKind::Delete { path: current.to_path_buf(), reason })
        })
    }

    async fn confirm(&self, question: String) -> Result<()> {
        if self.options.prompt && !self.console.confirm(&question).await {
            exn::bail!(ErrorKind::Declined(question));
        }
        Ok(())
    }

    fn remark(&self, entry: &mut Entry, err: Error) {
        let remark = (*err).to_string();
        tracing::warn!(path = %entry.current_name().display(), error = ?err, "Operation not performed");
        match &*err {
            ErrorKind::Declined(_) => {},
            ErrorKind::Skipped(_) => self.console.warning(&remark),
            _ => self.console.error(&remark),
        }
        entry.add_remark(remark);
    }
}

fn transfer_failed(err: ifs_storage::error::Error, target: &Path) -> Error {
    let reason = (*err).to_string();
    err.raise(ErrorKind::Transfer { path: target.to_path_buf(), reason })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::tests::ScriptedConsole;
    use ifs_index::{EntryId, Extension, IndexSettings, Pipeline, Target};
    use ifs_storage::backend::MockBackend;
    use std::path::PathBuf;

    const YES: ExecuteOptions = ExecuteOptions { prompt: false, allow_overwriting: false, create_directories: false };

    fn setup(backend: MockBackend, pipeline: Pipeline) -> (Arc<MockBackend>, FileIndex) {
        let backend = Arc::new(backend);
        let index = FileIndex::new(backend.clone(), pipeline, IndexSettings::default());
        (backend, index)
    }

    fn plan(index: &mut FileIndex, path: &str, targets: &[(&str, Action)]) -> EntryId {
        let id = index.insert(path, Action::Rename);
        let entry = index.get_mut(id).unwrap();
        entry.set_targets(targets.iter().map(|(target, action)| Target::new(*target, *action)).collect());
        id
    }

    #[tokio::test]
    async fn test_rename_copy_and_link() {
        let (backend, mut index) = setup(MockBackend::with_files([("a.txt", "a")]), Pipeline::default());
        plan(&mut index, "a.txt", &[("b.txt", Action::Rename), ("c.txt", Action::Copy), ("d.txt", Action::Link)]);
        let console = ScriptedConsole::default();

        let summary = Executor::new(&console, YES).execute(&mut index).await;
        assert_eq!(summary, ExecutionSummary { applied: 3, pending: 0 });
        assert!(index.is_empty());
        // The copy and the link start from the renamed file.
        assert_eq!(backend.operations().await, vec!["mv a.txt b.txt", "cp b.txt c.txt", "ln -s /b.txt d.txt"]);
        assert!(console.questions().is_empty());
    }

    #[tokio::test]
    async fn test_rename_updates_current_name() {
        let (_, mut index) = setup(MockBackend::with_files([("a.txt", "a")]), Pipeline::default());
        let id = plan(&mut index, "a.txt", &[("b.txt", Action::Rename), ("b.txt", Action::Ignore)]);
        let console = ScriptedConsole::default();
        Executor::new(&console, YES).execute(&mut index).await;
        assert_eq!(index.get(id).unwrap().current_name(), Path::new("b.txt"));
        assert_eq!(index.get(id).unwrap().targets(), &[Target::new("b.txt", Action::Ignore)]);
    }

    #[tokio::test]
    async fn test_overwrite_guard() {
        let (backend, mut index) = setup(MockBackend::with_files([("a.txt", "a"), ("b.txt", "b")]), Pipeline::default());
        let id = plan(&mut index, "a.txt", &[("b.txt", Action::Copy)]);
        let console = ScriptedConsole::default();

        let summary = Executor::new(&console, YES).execute(&mut index).await;
        assert_eq!(summary, ExecutionSummary { applied: 0, pending: 1 });
        assert!(backend.operations().await.is_empty());
        let entry = index.get(id).unwrap();
        assert_eq!(entry.targets(), &[Target::new("b.txt", Action::Copy)]);
        let remark = "Target file \"b.txt\" already exists. Use -o or --allow-overwriting option to force the overwrite.";
        assert_eq!(entry.remarks(), &[remark.to_string()]);
        assert_eq!(console.messages(), vec![format!("ERROR: {remark}")]);
    }

    #[tokio::test]
    async fn test_allowed_overwrite_is_announced() {
        let (backend, mut index) = setup(MockBackend::with_files([("a.txt", "a"), ("b.txt", "b")]), Pipeline::default());
        plan(&mut index, "a.txt", &[("b.txt", Action::Rename)]);
        let console = ScriptedConsole::answering([true]);
        let options = ExecuteOptions { allow_overwriting: true, ..ExecuteOptions::default() };

        let summary = Executor::new(&console, options).execute(&mut index).await;
        assert_eq!(summary.applied, 1);
        assert_eq!(
            console.questions(),
            vec!["Rename \"a.txt\" to \"b.txt\"? Destination file will be overwritten!".to_string()]
        );
        assert_eq!(backend.contents("b.txt").await, Some(b"a".to_vec()));
    }

    #[tokio::test]
    async fn test_declined_stays_pending() {
        let (backend, mut index) = setup(MockBackend::with_files([("a.txt", "a")]), Pipeline::default());
        let id = plan(&mut index, "a.txt", &[("x/a.txt", Action::Rename), ("a.txt", Action::Delete)]);
        let console = ScriptedConsole::answering([false, false]);

        let summary = Executor::new(&console, ExecuteOptions::default()).execute(&mut index).await;
        assert_eq!(summary, ExecutionSummary { applied: 0, pending: 1 });
        assert!(backend.operations().await.is_empty());
        assert_eq!(console.questions(), vec!["Move \"a.txt\" to \"x\"?", "Delete \"a.txt\"?"]);
        assert!(console.messages().is_empty());
        let entry = index.get(id).unwrap();
        assert_eq!(entry.targets().len(), 2);
        assert_eq!(entry.remarks()[0], "Declined: Move \"a.txt\" to \"x\"?");
    }

    #[tokio::test]
    async fn test_same_path_is_resolved_silently() {
        let (backend, mut index) = setup(MockBackend::with_files([("a.txt", "a")]), Pipeline::default());
        plan(&mut index, "a.txt", &[("a.txt", Action::Rename), ("a.txt", Action::Link)]);
        let console = ScriptedConsole::default();
        let summary = Executor::new(&console, ExecuteOptions::default()).execute(&mut index).await;
        assert_eq!(summary, ExecutionSummary { applied: 0, pending: 0 });
        assert!(console.questions().is_empty());
        assert!(backend.operations().await.is_empty());
    }

    #[tokio::test]
    async fn test_ignore_is_never_resolved() {
        let (_, mut index) = setup(MockBackend::with_files([("a.txt", "a")]), Pipeline::default());
        let id = plan(&mut index, "a.txt", &[("a.txt", Action::Ignore)]);
        let console = ScriptedConsole::default();
        for _ in 0..2 {
            let summary = Executor::new(&console, YES).execute(&mut index).await;
            assert_eq!(summary, ExecutionSummary { applied: 0, pending: 1 });
        }
        assert!(index.get(id).unwrap().remarks().is_empty());
    }

    #[tokio::test]
    async fn test_create_directories() {
        let (backend, mut index) = setup(MockBackend::with_files([("a.txt", "a")]), Pipeline::default());
        plan(&mut index, "a.txt", &[("sorted/2024/a.txt", Action::Rename)]);
        let console = ScriptedConsole::answering([true, true]);
        let options = ExecuteOptions { create_directories: true, ..ExecuteOptions::default() };

        let summary = Executor::new(&console, options).execute(&mut index).await;
        assert_eq!(summary.applied, 1);
        assert_eq!(
            console.questions(),
            vec![
                "Move \"a.txt\" to \"sorted/2024\"?",
                "Target directory \"sorted/2024\" does not exist. Create it?",
            ]
        );
        assert_eq!(backend.operations().await, vec!["mkdir -p sorted/2024", "mv a.txt sorted/2024/a.txt"]);
    }

    #[tokio::test]
    async fn test_missing_directory_without_creation() {
        let (backend, mut index) = setup(MockBackend::with_files([("a.txt", "a")]), Pipeline::default());
        let id = plan(&mut index, "a.txt", &[("sorted/a.txt", Action::Copy)]);
        let console = ScriptedConsole::default();
        Executor::new(&console, YES).execute(&mut index).await;
        assert!(backend.operations().await.is_empty());
        assert_eq!(
            index.get(id).unwrap().remarks(),
            &["Could not create the target file sorted/a.txt: no such file or directory: sorted".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_directory_creation() {
        let backend = MockBackend::with_files([("a.txt", "a")]).fail_on("locked");
        let (backend, mut index) = setup(backend, Pipeline::default());
        let id = plan(&mut index, "a.txt", &[("locked/a.txt", Action::Rename)]);
        let console = ScriptedConsole::default();
        let options = ExecuteOptions { create_directories: true, ..YES };
        Executor::new(&console, options).execute(&mut index).await;
        assert!(backend.operations().await.is_empty());
        let entry = index.get(id).unwrap();
        assert_eq!(entry.current_name(), Path::new("a.txt"));
        assert_eq!(entry.remarks(), &["Could not create directory \"locked\": permission denied: locked".to_string()]);
    }

    #[tokio::test]
    async fn test_delete() {
        let backend = MockBackend::with_files([("a.txt", "a"), ("b.txt", "b")]).fail_on("b.txt");
        let (backend, mut index) = setup(backend, Pipeline::default());
        plan(&mut index, "a.txt", &[("a.txt", Action::Delete)]);
        let kept = plan(&mut index, "b.txt", &[("b.txt", Action::Delete)]);
        let console = ScriptedConsole::default();

        let summary = Executor::new(&console, YES).execute(&mut index).await;
        assert_eq!(summary, ExecutionSummary { applied: 1, pending: 1 });
        assert_eq!(backend.operations().await, vec!["rm a.txt"]);
        assert_eq!(index.ids(), vec![kept]);
        assert_eq!(
            index.get(kept).unwrap().remarks(),
            &["Could not delete \"b.txt\": permission denied: b.txt".to_string()]
        );
    }

    struct Guard;

    impl Extension for Guard {
        fn name(&self) -> &str {
            "guard"
        }

        fn description(&self) -> &str {
            "Refuses to touch read-only files"
        }

        fn before_file_ops(&self, entry: &Entry) -> ifs_index::error::Result<()> {
            if entry.current_name().starts_with("readonly") {
                exn::bail!(ifs_index::error::ErrorKind::Extension("read-only file".to_string()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_extension_can_skip_an_entry() {
        let backend = MockBackend::with_files([("readonly/a.txt", "a"), ("b.txt", "b")]);
        let (backend, mut index) = setup(backend, Pipeline::new(vec![Box::new(Guard)]));
        let skipped = plan(&mut index, "readonly/a.txt", &[("a.txt", Action::Rename)]);
        plan(&mut index, "b.txt", &[("c.txt", Action::Rename)]);
        let console = ScriptedConsole::default();

        let summary = Executor::new(&console, YES).execute(&mut index).await;
        assert_eq!(summary, ExecutionSummary { applied: 1, pending: 1 });
        assert_eq!(backend.operations().await, vec!["mv b.txt c.txt"]);
        let entry = index.get(skipped).unwrap();
        assert_eq!(entry.targets(), &[Target::new(PathBuf::from("a.txt"), Action::Rename)]);
        assert!(entry.remarks()[0].starts_with("Operations skipped: "));
        assert_eq!(console.messages(), vec![format!("WARNING: {}", entry.remarks()[0])]);
    }
}
