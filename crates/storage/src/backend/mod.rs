//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, the unified interface every
//! filesystem query and mutation of the tool goes through. Swapping the
//! backend is how simulation mode and the in-memory test double work.

mod local;
#[cfg(feature = "mock")]
mod mock;
mod simulated;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
pub use self::simulated::SimulatedBackend;
use crate::error::Result;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::path::{Path, PathBuf};
use std::pin::Pin;

pub type PathStream<'a> = Pin<Box<dyn Stream<Item = Result<PathBuf>> + Send + 'a>>;

/// Traversal strategy for [`StorageBackend::walk`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WalkMode {
    /// Descend into every subdirectory (symbolic links to directories are
    /// reported but never followed).
    #[default]
    Recursive,
    /// Only the immediate children of the root.
    SingleLevel,
}

enum WalkEntry {
    File(PathBuf),
    Directory { path: PathBuf, descend: bool },
}

/// Unified interface for filesystem access.
///
/// All operations are asynchronous; paths are used as given (relative paths
/// are resolved against the current working directory by the operating
/// system). Errors are classified into [`ErrorKind`](crate::error::ErrorKind)
/// so callers can turn them into remarks without inspecting I/O internals.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use ifs_storage::{backend::StorageBackend, error::Result};
///
/// async fn tidy(backend: &dyn StorageBackend) -> Result<()> {
///     let (source, target) = (Path::new("IMG_0001.jpg"), Path::new("photos/holiday.jpg"));
///     if !backend.is_dir(Path::new("photos")).await? {
///         backend.mkdir(Path::new("photos")).await?;
///     }
///     backend.rename(source, target).await
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the backend, used for logging only.
    fn name(&self) -> &str;

    /// Resolve `path` to an absolute, lexically normalized path without
    /// touching the filesystem (symbolic links are kept as they are).
    fn absolute(&self, path: &Path) -> Result<PathBuf> {
        let absolute = std::path::absolute(path).map_err(|e| crate::error::ErrorKind::from_io(e, path))?;
        Ok(crate::normalize(absolute))
    }

    /// Stream every path below `root`.
    ///
    /// Files (and anything that is not a directory, including broken
    /// symbolic links) are always yielded; directories only when
    /// `include_directories` is set. Entries of one directory are yielded in
    /// name order, before descending into its subdirectories. The stream is
    /// finite and cannot be restarted.
    ///
    /// An unreadable subdirectory yields an error item and traversal carries
    /// on with the next directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use futures::TryStreamExt;
    /// use std::path::Path;
    /// # use ifs_storage::{backend::StorageBackend, WalkMode, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let mut stream = backend.walk(Path::new("music"), WalkMode::Recursive, false);
    /// while let Some(path) = stream.try_next().await? {
    ///     println!("{}", path.display());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    fn walk<'a>(&'a self, root: &'a Path, mode: WalkMode, include_directories: bool) -> PathStream<'a>;

    /// Collect the whole of [`walk()`](Self::walk) into a [`Vec`], stopping
    /// at the first error.
    async fn list(&self, root: &Path, mode: WalkMode, include_directories: bool) -> Result<Vec<PathBuf>> {
        self.walk(root, mode, include_directories).try_collect().await
    }

    /// Check whether anything (including a broken symbolic link) exists at
    /// `path`.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Check whether `path` resolves to a directory.
    async fn is_dir(&self, path: &Path) -> Result<bool>;

    /// Check whether `path` resolves to a regular file.
    async fn is_file(&self, path: &Path) -> Result<bool>;

    /// Readability check: succeeds if `path` is a directory or a file that
    /// can be opened for reading.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) for missing
    /// files and broken symbolic links, and
    /// [`PermissionDenied`](crate::error::ErrorKind::PermissionDenied) for
    /// unreadable ones.
    async fn probe(&self, path: &Path) -> Result<()>;

    /// Create a directory and all of its missing parents.
    async fn mkdir(&self, path: &Path) -> Result<()>;

    /// Rename or move a file. An existing destination is replaced.
    async fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Copy a file's contents. An existing destination is replaced.
    async fn copy(&self, from: &Path, to: &Path) -> Result<()>;

    /// Create a symbolic link at `link` pointing at `source`.
    ///
    /// The stored link target is absolute, so the link resolves no matter
    /// which directory it is created in. An existing file at `link` is
    /// replaced.
    async fn link(&self, source: &Path, link: &Path) -> Result<()>;

    /// Delete a file, or an *empty* directory.
    async fn delete(&self, path: &Path) -> Result<()>;
}
