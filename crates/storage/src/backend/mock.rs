//! In-memory storage backend for testing.

use super::{PathStream, WalkEntry, WalkMode};
use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::normalize;
use async_stream::stream;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

#[derive(Clone, Debug)]
enum Node {
    File(Vec<u8>),
    Directory,
    Link(PathBuf),
}

#[derive(Default)]
struct State {
    nodes: BTreeMap<PathBuf, Node>,
    failures: HashSet<PathBuf>,
    operations: Vec<String>,
}
impl State {
    fn fail_if_injected(&self, path: &Path) -> Result<()> {
        if self.failures.contains(path) {
            exn::bail!(ErrorKind::PermissionDenied(path.to_path_buf()));
        }
        Ok(())
    }

    /// Follow a chain of links to the node they point at.
    fn resolve(&self, path: &Path) -> Option<&Node> {
        let mut current = path.to_path_buf();
        for _ in 0..16 {
            match self.nodes.get(&current) {
                Some(Node::Link(target)) => current = key(target),
                other => return other,
            }
        }
        None
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.as_os_str().is_empty() || matches!(self.resolve(path), Some(Node::Directory))
    }

    fn require_parent(&self, path: &Path) -> Result<()> {
        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
        if !self.is_dir(&parent) {
            exn::bail!(ErrorKind::NotFound(parent));
        }
        Ok(())
    }

    fn insert_with_parents(&mut self, path: PathBuf, node: Node) {
        for ancestor in path.ancestors().skip(1) {
            if !ancestor.as_os_str().is_empty() {
                self.nodes.entry(ancestor.to_path_buf()).or_insert(Node::Directory);
            }
        }
        self.nodes.insert(path, node);
    }

    fn children(&self, directory: &Path) -> Vec<(PathBuf, Node)> {
        self.nodes
            .iter()
            .filter(|(path, _)| path.parent() == Some(directory) && path.as_path() != directory)
            .map(|(path, node)| (path.clone(), node.clone()))
            .collect()
    }
}

/// The current directory doubles as `/`, the (always existing) root of the
/// mock tree.
fn key(path: &Path) -> PathBuf {
    let normalized = normalize(path);
    let relative = normalized.strip_prefix("/").unwrap_or(&normalized);
    if relative == Path::new(".") { PathBuf::new() } else { relative.to_path_buf() }
}

/// In-memory storage backend for testing.
///
/// Files live in a map behind a [`RwLock`], so all trait methods can operate
/// on `&self` without external synchronisation. Paths are used as given (the
/// current directory is the root of the tree). Every successful mutation is
/// recorded as a shell-like command, and failures can be injected per path.
///
/// # Examples
///
/// ```
/// use ifs_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([("music/a.mp3", b"ID3...")]);
/// assert!(backend.is_dir(Path::new("music")).await?);
///
/// backend.rename(Path::new("music/a.mp3"), Path::new("music/b.mp3")).await?;
/// assert_eq!(backend.operations().await, vec!["mv music/a.mp3 music/b.mp3"]);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    state: RwLock<State>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files; parent directories
    /// are created implicitly.
    pub fn with_files(files: impl IntoIterator<Item = (impl AsRef<Path>, impl Into<Vec<u8>>)>) -> Self {
        let mut state = State::default();
        for (path, data) in files {
            state.insert_with_parents(key(path.as_ref()), Node::File(data.into()));
        }
        Self {
            name: "mock".to_string(),
            state: RwLock::new(state),
        }
    }

    /// Change the name of the mock backend.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add an empty directory.
    pub fn with_directory(mut self, path: impl AsRef<Path>) -> Self {
        self.state.get_mut().insert_with_parents(key(path.as_ref()), Node::Directory);
        self
    }

    /// Make every probe or mutation touching `path` fail with
    /// [`PermissionDenied`](ErrorKind::PermissionDenied).
    pub fn fail_on(mut self, path: impl AsRef<Path>) -> Self {
        self.state.get_mut().failures.insert(key(path.as_ref()));
        self
    }

    /// Commands of every successful mutation so far, in order.
    pub async fn operations(&self) -> Vec<String> {
        self.state.read().await.operations.clone()
    }

    /// Contents of the file at `path` (following links).
    pub async fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.state.read().await.resolve(&key(path.as_ref())) {
            Some(Node::File(data)) => Some(data.clone()),
            _ => None,
        }
    }

    /// Target of the link at `path`, if it is one.
    pub async fn link_target(&self, path: impl AsRef<Path>) -> Option<PathBuf> {
        match self.state.read().await.nodes.get(&key(path.as_ref())) {
            Some(Node::Link(target)) => Some(target.clone()),
            _ => None,
        }
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &[u8]); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn absolute(&self, path: &Path) -> Result<PathBuf> {
        Ok(normalize(Path::new("/").join(path)))
    }

    fn walk<'a>(&'a self, root: &'a Path, mode: WalkMode, include_directories: bool) -> PathStream<'a> {
        let mut stack = vec![key(root)];

        Box::pin(stream! {
            'dirs: while let Some(current) = stack.pop() {
                // Snapshot under the read lock, then drop it before yielding
                // to avoid holding the lock across yield points.
                let children: Option<Vec<WalkEntry>> = {
                    let guard = self.state.read().await;
                    guard.is_dir(&current).then(|| {
                        guard
                            .children(&current)
                            .into_iter()
                            .map(|(path, node)| match node {
                                Node::Directory => WalkEntry::Directory { path, descend: true },
                                Node::Link(_) if guard.is_dir(&path) => WalkEntry::Directory { path, descend: false },
                                _ => WalkEntry::File(path),
                            })
                            .collect()
                    })
                };
                let Some(children) = children else {
                    yield Err(exn::Exn::from(ErrorKind::NotFound(current)));
                    continue 'dirs;
                };
                let mut subdirectories = Vec::new();
                for child in children {
                    match child {
                        WalkEntry::File(path) => yield Ok(path),
                        WalkEntry::Directory { path, descend } => {
                            if include_directories {
                                yield Ok(path.clone());
                            }
                            if descend && mode == WalkMode::Recursive {
                                subdirectories.push(path);
                            }
                        },
                    }
                }
                stack.extend(subdirectories.into_iter().rev());
            }
        })
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let path = key(path);
        Ok(path.as_os_str().is_empty() || self.state.read().await.nodes.contains_key(&path))
    }

    async fn is_dir(&self, path: &Path) -> Result<bool> {
        Ok(self.state.read().await.is_dir(&key(path)))
    }

    async fn is_file(&self, path: &Path) -> Result<bool> {
        Ok(matches!(self.state.read().await.resolve(&key(path)), Some(Node::File(_))))
    }

    async fn probe(&self, path: &Path) -> Result<()> {
        let path = key(path);
        let guard = self.state.read().await;
        guard.fail_if_injected(&path)?;
        if !path.as_os_str().is_empty() && guard.resolve(&path).is_none() {
            exn::bail!(ErrorKind::NotFound(path));
        }
        Ok(())
    }

    async fn mkdir(&self, path: &Path) -> Result<()> {
        let path = key(path);
        let mut guard = self.state.write().await;
        guard.fail_if_injected(&path)?;
        for ancestor in path.ancestors() {
            if let Some(Node::File(_)) = guard.nodes.get(ancestor) {
                exn::bail!(ErrorKind::AlreadyExists(ancestor.to_path_buf()));
            }
        }
        guard.insert_with_parents(path.clone(), Node::Directory);
        guard.operations.push(format!("mkdir -p {}", path.display()));
        Ok(())
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let (from, to) = (key(from), key(to));
        let mut guard = self.state.write().await;
        guard.fail_if_injected(&from)?;
        guard.fail_if_injected(&to)?;
        if !guard.nodes.contains_key(&from) {
            exn::bail!(ErrorKind::NotFound(from));
        }
        guard.require_parent(&to)?;
        // Move the node along with everything below it.
        let moved: Vec<PathBuf> = guard.nodes.keys().filter(|p| p.starts_with(&from)).cloned().collect();
        for old in moved {
            if let Some(node) = guard.nodes.remove(&old) {
                let suffix = old.strip_prefix(&from).map(Path::to_path_buf).unwrap_or_default();
                let new = if suffix.as_os_str().is_empty() { to.clone() } else { to.join(suffix) };
                guard.nodes.insert(new, node);
            }
        }
        guard.operations.push(format!("mv {} {}", from.display(), to.display()));
        Ok(())
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let (from, to) = (key(from), key(to));
        let mut guard = self.state.write().await;
        guard.fail_if_injected(&from)?;
        guard.fail_if_injected(&to)?;
        let data = match guard.resolve(&from) {
            Some(Node::File(data)) => data.clone(),
            Some(_) => exn::bail!(ErrorKind::InvalidPath(from)),
            None => exn::bail!(ErrorKind::NotFound(from)),
        };
        guard.require_parent(&to)?;
        guard.nodes.insert(to.clone(), Node::File(data));
        guard.operations.push(format!("cp {} {}", from.display(), to.display()));
        Ok(())
    }

    async fn link(&self, source: &Path, link: &Path) -> Result<()> {
        let source = self.absolute(source)?;
        let link = key(link);
        let mut guard = self.state.write().await;
        guard.fail_if_injected(&link)?;
        guard.require_parent(&link)?;
        guard.nodes.insert(link.clone(), Node::Link(source.clone()));
        guard.operations.push(format!("ln -s {} {}", source.display(), link.display()));
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let path = key(path);
        let mut guard = self.state.write().await;
        guard.fail_if_injected(&path)?;
        match guard.nodes.get(&path) {
            None => exn::bail!(ErrorKind::NotFound(path)),
            Some(Node::Directory) if !guard.children(&path).is_empty() => exn::bail!(ErrorKind::NotEmpty(path)),
            Some(_) => {},
        }
        guard.nodes.remove(&path);
        guard.operations.push(format!("rm {}", path.display()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(list: &[&str]) -> Vec<PathBuf> {
        list.iter().map(PathBuf::from).collect()
    }

    #[tokio::test]
    async fn test_with_files_creates_parents() {
        let backend = MockBackend::with_files([("a/b/file.txt", b"data")]);
        assert!(backend.is_dir(Path::new("a")).await.unwrap());
        assert!(backend.is_dir(Path::new("a/b")).await.unwrap());
        assert!(backend.is_file(Path::new("a/b/file.txt")).await.unwrap());
        assert!(backend.is_dir(Path::new(".")).await.unwrap());
        assert!(!backend.exists(Path::new("c/nope")).await.unwrap());
    }

    #[tokio::test]
    async fn test_walk_matches_local_order() {
        let backend = MockBackend::with_files([
            ("root/b.txt", "b"),
            ("root/a.txt", "a"),
            ("root/sub/deeper/y.txt", "y"),
            ("root/sub/z.txt", "z"),
        ]);
        let files = backend.list(Path::new("root"), WalkMode::Recursive, false).await.unwrap();
        assert_eq!(files, paths(&["root/a.txt", "root/b.txt", "root/sub/z.txt", "root/sub/deeper/y.txt"]));
        let top = backend.list(Path::new("root"), WalkMode::SingleLevel, true).await.unwrap();
        assert_eq!(top, paths(&["root/a.txt", "root/b.txt", "root/sub"]));
    }

    #[tokio::test]
    async fn test_walk_missing_root() {
        let backend = MockBackend::default();
        let err = backend.list(Path::new("nope"), WalkMode::Recursive, false).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rename_requires_target_directory() {
        let backend = MockBackend::with_files([("a.txt", "data")]);
        let err = backend.rename(Path::new("a.txt"), Path::new("dir/a.txt")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
        backend.mkdir(Path::new("dir")).await.unwrap();
        backend.rename(Path::new("a.txt"), Path::new("dir/a.txt")).await.unwrap();
        assert_eq!(backend.contents("dir/a.txt").await.unwrap(), b"data");
        assert_eq!(backend.operations().await, vec!["mkdir -p dir", "mv a.txt dir/a.txt"]);
    }

    #[tokio::test]
    async fn test_rename_moves_directory_contents() {
        let backend = MockBackend::with_files([("old/x.txt", "x")]);
        backend.rename(Path::new("old"), Path::new("new")).await.unwrap();
        assert_eq!(backend.contents("new/x.txt").await.unwrap(), b"x");
        assert!(!backend.exists(Path::new("old/x.txt")).await.unwrap());
    }

    #[tokio::test]
    async fn test_copy_and_link() {
        let backend = MockBackend::with_files([("a.txt", "data")]);
        backend.copy(Path::new("a.txt"), Path::new("b.txt")).await.unwrap();
        backend.link(Path::new("a.txt"), Path::new("c.txt")).await.unwrap();
        assert_eq!(backend.contents("b.txt").await.unwrap(), b"data");
        assert_eq!(backend.contents("c.txt").await.unwrap(), b"data");
        assert_eq!(backend.link_target("c.txt").await.unwrap(), Path::new("/a.txt"));
    }

    #[tokio::test]
    async fn test_delete() {
        let backend = MockBackend::with_files([("dir/a.txt", "data")]);
        let err = backend.delete(Path::new("dir")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotEmpty(_)));
        backend.delete(Path::new("dir/a.txt")).await.unwrap();
        backend.delete(Path::new("dir")).await.unwrap();
        let err = backend.delete(Path::new("dir")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let backend = MockBackend::with_files([("locked.txt", "data")]).fail_on("locked.txt");
        let err = backend.probe(Path::new("locked.txt")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::PermissionDenied(_)));
        let err = backend.delete(Path::new("locked.txt")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::PermissionDenied(_)));
        assert!(backend.operations().await.is_empty());
        assert!(backend.exists(Path::new("locked.txt")).await.unwrap());
    }
}
