//! The in-memory file index and the extension pipeline that annotates it.
//!
//! A [`FileIndex`] owns one [`Entry`] per discovered file. Every entry holds
//! the operations still pending on that file; once they are all done the
//! entry is resolved and [`purge()`](FileIndex::purge) drops it. Extensions
//! (see [`Extension`]) filter files on the way in, annotate them, and regroup
//! the whole index before it is shown to the user.

mod action;
mod entry;
pub mod error;
mod extension;
mod index;
mod params;

pub use crate::action::Action;
pub use crate::entry::{Entry, EntryId, Metadata, Target};
pub use crate::extension::{Enriched, Extension, Pipeline};
pub use crate::index::{Admission, FileIndex, IndexSettings};
pub use crate::params::{ParamSpec, Params};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, Result};
    use ifs_storage::BackendHandle;
    use ifs_storage::backend::MockBackend;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn backend(files: &[&str]) -> BackendHandle {
        Arc::new(MockBackend::with_files(files.iter().map(|f| (*f, *f))))
    }

    fn index(files: &[&str], extensions: Vec<Box<dyn Extension>>) -> FileIndex {
        FileIndex::new(backend(files), Pipeline::new(extensions), IndexSettings::default())
    }

    /// Rejects `.tmp` files, groups everything else by extension.
    struct ByExtension {
        calls: Arc<AtomicUsize>,
    }

    impl Extension for ByExtension {
        fn name(&self) -> &str {
            "by-extension"
        }

        fn before_file_added(&self, path: &Path) -> bool {
            path.extension().is_none_or(|ext| ext != "tmp")
        }

        fn after_file_added(&self, entry: &mut Entry) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let Some(ext) = entry.current_name().extension() else {
                exn::bail!(ErrorKind::Extension("no file extension".to_string()));
            };
            let group = ext.to_string_lossy().into_owned();
            entry.assign_to_group(group);
            entry.metadata_mut().load([("kind".to_string(), "file".to_string())]);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_ids_are_unique_and_increasing() {
        let mut index = index(&["a", "b", "c"], vec![]);
        let ids = index.add(["a", "b", "c"], None).await;
        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        index.remove(ids[2]);
        let again = index.add(["c"], None).await;
        assert!(again[0] > ids[2]);
    }

    #[tokio::test]
    async fn test_add_creates_fresh_entries() {
        let mut index = index(&["music/a.mp3"], vec![]);
        let ids = index.add(["music/a.mp3"], Some(Action::Copy)).await;
        let entry = index.get(ids[0]).unwrap();
        assert_eq!(entry.targets(), &[Target::new("music/a.mp3", Action::Copy)]);
        assert!(entry.remarks().is_empty());
        assert_eq!(entry.group(), None);
    }

    #[tokio::test]
    async fn test_add_skips_unreadable_and_vetoed_files() {
        let files = [("ok.txt", "x"), ("locked.txt", "x"), ("x.tmp", "x")];
        let backend: BackendHandle = Arc::new(MockBackend::with_files(files).fail_on("locked.txt"));
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new(vec![Box::new(ByExtension { calls: calls.clone() })]);
        let mut index = FileIndex::new(backend, pipeline, IndexSettings::default());
        let ids = index.add(["ok.txt", "locked.txt", "x.tmp", "missing.txt"], None).await;
        assert_eq!(ids.len(), 1);
        assert_eq!(index.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let entry = index.get(ids[0]).unwrap();
        assert_eq!(entry.group(), Some("txt"));
        assert_eq!(entry.metadata().get("kind"), Some("file"));
        assert_eq!(index.groups(), &["txt".to_string()]);
    }

    #[tokio::test]
    async fn test_failing_hook_leaves_a_remark() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut index = index(&["README"], vec![Box::new(ByExtension { calls })]);
        let ids = index.add(["README"], None).await;
        let entry = index.get(ids[0]).unwrap();
        assert_eq!(entry.remarks(), &["by-extension: no file extension".to_string()]);
        assert_eq!(entry.group(), None);
    }

    #[tokio::test]
    async fn test_absolute_paths_policy() {
        let settings = IndexSettings { absolute_paths: true, ..Default::default() };
        let mut index = FileIndex::new(backend(&["dir/a.txt"]), Pipeline::default(), settings);
        let ids = index.add(["dir/./b/../a.txt"], None).await;
        assert_eq!(index.get(ids[0]).unwrap().current_name(), Path::new("/dir/a.txt"));
    }

    #[tokio::test]
    async fn test_purge_drops_resolved_entries_and_stale_groups() {
        let mut index = index(&["a", "b", "c", "d"], vec![]);
        let ids = index.add(["a", "b", "c", "d"], None).await;
        index.assign_to_group(ids[0], "one");
        index.assign_to_group(ids[1], "two");
        index.assign_to_group(ids[2], "two");
        index.register_group("orphan");
        index.get_mut(ids[1]).unwrap().reset();
        index.get_mut(ids[3]).unwrap().reset();
        index.purge();
        assert_eq!(index.ids(), vec![ids[0], ids[2]]);
        assert_eq!(index.groups(), &["one".to_string(), "two".to_string()]);
        assert!(index.iter().all(|entry| !entry.is_resolved()));
        assert_eq!(index.pending_count(), 2);
    }

    #[tokio::test]
    async fn test_files_by_group() {
        let mut index = index(&["a", "b", "c", "d"], vec![]);
        let ids = index.add(["a", "b", "c", "d"], None).await;
        index.assign_to_group(ids[2], "second");
        index.assign_to_group(ids[3], "first");
        index.assign_to_group(ids[0], "second");
        let (grouped, ungrouped) = index.files_by_group();
        let names = |entries: &[&Entry]| entries.iter().map(|e| e.current_name().to_path_buf()).collect::<Vec<_>>();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, "second");
        assert_eq!(names(&grouped[0].1), vec![PathBuf::from("a"), PathBuf::from("c")]);
        assert_eq!(grouped[1].0, "first");
        assert_eq!(names(&grouped[1].1), vec![PathBuf::from("d")]);
        assert_eq!(names(&ungrouped), vec![PathBuf::from("b")]);
    }

    #[tokio::test]
    async fn test_commit_registers_group() {
        let mut index = index(&["a"], vec![]);
        let id = index.insert("a", Action::Rename);
        let mut copy = index.get(id).unwrap().clone();
        copy.assign_to_group("g");
        copy.add_remark("note");
        assert!(index.groups().is_empty());
        assert!(index.commit(copy.clone()));
        assert_eq!(index.groups(), &["g".to_string()]);
        assert_eq!(index.get(id).unwrap().remarks(), &["note".to_string()]);
        index.remove(id);
        assert!(!index.commit(copy));
    }

    #[tokio::test]
    async fn test_complete_runs_hooks_then_purges() {
        struct DropAll;
        impl Extension for DropAll {
            fn name(&self) -> &str {
                "drop-all"
            }
            fn on_index_complete(&self, index: &mut FileIndex) -> Result<()> {
                for entry in index.iter_mut() {
                    entry.reset();
                }
                Ok(())
            }
        }
        let mut index = index(&["a", "b"], vec![Box::new(DropAll)]);
        index.add(["a", "b"], None).await;
        index.complete();
        assert!(index.is_empty());
    }
}
