//! Simulation storage backend.
//!
//! Wraps another backend: queries pass straight through, while mutating calls
//! only print the shell command that would have been run, then report success.

use super::{PathStream, WalkMode};
use crate::error::Result;
use crate::{BackendHandle, StorageBackend};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Dry-run storage backend.
///
/// Every mutation is logged as an [`info event`](tracing::Event) in the form
/// of the equivalent shell command (`mv a b`, `cp a b`, `ln -s a b`, `rm a`,
/// `mkdir -p d`) and then silently dropped.
#[derive(Clone)]
pub struct SimulatedBackend {
    inner: BackendHandle,
}
impl SimulatedBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StorageBackend for SimulatedBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn absolute(&self, path: &Path) -> Result<PathBuf> {
        self.inner.absolute(path)
    }

    fn walk<'a>(&'a self, root: &'a Path, mode: WalkMode, include_directories: bool) -> PathStream<'a> {
        self.inner.walk(root, mode, include_directories)
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        self.inner.exists(path).await
    }

    async fn is_dir(&self, path: &Path) -> Result<bool> {
        self.inner.is_dir(path).await
    }

    async fn is_file(&self, path: &Path) -> Result<bool> {
        self.inner.is_file(path).await
    }

    async fn probe(&self, path: &Path) -> Result<()> {
        self.inner.probe(path).await
    }

    async fn mkdir(&self, path: &Path) -> Result<()> {
        tracing::info!("mkdir -p {}", path.display());
        Ok(())
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        tracing::info!("mv {} {}", from.display(), to.display());
        Ok(())
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        tracing::info!("cp {} {}", from.display(), to.display());
        Ok(())
    }

    async fn link(&self, source: &Path, link: &Path) -> Result<()> {
        tracing::info!("ln -s {} {}", source.display(), link.display());
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        tracing::info!("rm {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_mutations_are_dropped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("file.txt");
        std::fs::write(&file, b"data").unwrap();
        let backend = SimulatedBackend::new(Arc::new(LocalBackend::new("local")));

        backend.rename(&file, &temp_dir.path().join("moved.txt")).await.unwrap();
        backend.copy(&file, &temp_dir.path().join("copy.txt")).await.unwrap();
        backend.link(&file, &temp_dir.path().join("link.txt")).await.unwrap();
        backend.mkdir(&temp_dir.path().join("dir")).await.unwrap();
        backend.delete(&file).await.unwrap();

        let remaining = backend.list(temp_dir.path(), WalkMode::Recursive, true).await.unwrap();
        assert_eq!(remaining, vec![file.clone()]);
    }

    #[tokio::test]
    async fn test_queries_pass_through() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("file.txt");
        std::fs::write(&file, b"data").unwrap();
        let backend = SimulatedBackend::new(Arc::new(LocalBackend::new("local")));
        assert_eq!(backend.name(), "local");
        assert!(backend.exists(&file).await.unwrap());
        assert!(backend.is_file(&file).await.unwrap());
        assert!(backend.probe(&temp_dir.path().join("nope")).await.is_err());
    }
}
