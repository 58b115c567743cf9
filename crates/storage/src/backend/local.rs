//! Local filesystem storage backend.
//!
//! This module provides a storage backend implementation for the local
//! filesystem, using `tokio::fs` for async I/O. Unlike a storage library there
//! is no root directory: paths are used exactly as the user typed them.

use super::{PathStream, WalkEntry, WalkMode};
use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use async_stream::stream;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirEntry};

/// Local filesystem storage backend.
///
/// # Examples
///
/// ```no_run
/// use ifs_storage::backend::{LocalBackend, StorageBackend};
/// use std::path::Path;
///
/// # async fn example() -> ifs_storage::error::Result<()> {
/// let backend = LocalBackend::new("local");
/// backend.rename(Path::new("draft.txt"), Path::new("final.txt")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalBackend {
    name: String,
}
impl LocalBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Classify a directory entry without following symbolic links any
    /// further than needed to tell whether they point at a directory.
    async fn process_entry(entry: &DirEntry) -> Result<WalkEntry> {
        let path = entry.path();
        let file_type = entry.file_type().await.map_err(|e| ErrorKind::from_io(e, &path))?;
        if file_type.is_dir() {
            return Ok(WalkEntry::Directory { path, descend: true });
        }
        if file_type.is_symlink() {
            // Broken links fall through as files; the readability probe
            // reports them when they are registered.
            if let Ok(target) = fs::metadata(&path).await
                && target.is_dir()
            {
                return Ok(WalkEntry::Directory { path, descend: false });
            }
        }
        Ok(WalkEntry::File(path))
    }

    /// Read a whole directory and return its entries in name order.
    async fn read_sorted(directory: &Path) -> Result<Vec<DirEntry>> {
        let mut reader = fs::read_dir(directory).await.map_err(|e| ErrorKind::from_io(e, directory))?;
        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await.map_err(|e| ErrorKind::from_io(e, directory))? {
            entries.push(entry);
        }
        entries.sort_by_key(DirEntry::file_name);
        Ok(entries)
    }

    #[cfg(unix)]
    async fn symlink(source: &Path, link: &Path) -> std::io::Result<()> {
        fs::symlink(source, link).await
    }

    #[cfg(windows)]
    async fn symlink(source: &Path, link: &Path) -> std::io::Result<()> {
        match fs::metadata(source).await.map(|m| m.is_dir()) {
            Ok(true) => fs::symlink_dir(source, link).await,
            _ => fs::symlink_file(source, link).await,
        }
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn walk<'a>(&'a self, root: &'a Path, mode: WalkMode, include_directories: bool) -> PathStream<'a> {
        let mut stack: Vec<PathBuf> = vec![root.to_path_buf()];

        Box::pin(stream! {
            'dirs: while let Some(current) = stack.pop() {
                let entries = match Self::read_sorted(&current).await {
                    Ok(entries) => entries,
                    Err(e) => {
                        yield Err(e);
                        continue 'dirs;
                    },
                };

                let mut subdirectories = Vec::new();
                'entries: for entry in entries {
                    let walked = match Self::process_entry(&entry).await {
                        Ok(walked) => walked,
                        Err(e) => {
                            yield Err(e);
                            continue 'entries;
                        },
                    };
                    match walked {
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
                // Reversed so the stack pops subdirectories in name order.
                stack.extend(subdirectories.into_iter().rev());
            }
        })
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        match fs::symlink_metadata(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ErrorKind::from_io(e, path).into()),
        }
    }

    async fn is_dir(&self, path: &Path) -> Result<bool> {
        Ok(fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false))
    }

    async fn is_file(&self, path: &Path) -> Result<bool> {
        Ok(fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false))
    }

    async fn probe(&self, path: &Path) -> Result<()> {
        let metadata = fs::metadata(path).await.map_err(|e| ErrorKind::from_io(e, path))?;
        if !metadata.is_dir() {
            fs::File::open(path).await.map_err(|e| ErrorKind::from_io(e, path))?;
        }
        Ok(())
    }

    async fn mkdir(&self, path: &Path) -> Result<()> {
        Ok(fs::create_dir_all(path).await.map_err(|e| ErrorKind::from_io(e, path))?)
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        Ok(fs::rename(from, to).await.map_err(|e| ErrorKind::from_io(e, from))?)
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        fs::copy(from, to).await.map_err(|e| ErrorKind::from_io(e, from))?;
        Ok(())
    }

    async fn link(&self, source: &Path, link: &Path) -> Result<()> {
        let source = self.absolute(source)?;
        if fs::symlink_metadata(link).await.is_ok() {
            fs::remove_file(link).await.map_err(|e| ErrorKind::from_io(e, link))?;
        }
        Ok(Self::symlink(&source, link).await.map_err(|e| ErrorKind::from_io(e, link))?)
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let metadata = fs::symlink_metadata(path).await.map_err(|e| ErrorKind::from_io(e, path))?;
        let result = if metadata.is_dir() { fs::remove_dir(path).await } else { fs::remove_file(path).await };
        Ok(result.map_err(|e| ErrorKind::from_io(e, path))?)
    }
}
