//! Concurrent discovery and enrichment of files.
//!
//! A single producer walks the sources, admits each path and inserts it into
//! the index, then queues the new entry id on a bounded channel. A pool of
//! workers takes ids off the queue, enriches a detached copy of the entry
//! (the extension hooks run on the blocking thread pool) and commits the
//! result back. The index lock is only held to insert, copy and commit.
//! Closing the channel is the completion signal: the scan returns once the
//! producer is done and every worker has drained the queue.

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use ifs_index::{EntryId, FileIndex};
use ifs_storage::WalkMode;
use ifs_storage::backend::PathStream;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Worker count used when none is configured: the available parallelism.
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map(usize::from).unwrap_or(4)
}

/// A file or directory to scan, and how deep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Source {
    pub path: PathBuf,
    pub mode: WalkMode,
}

impl Source {
    pub fn recursive(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), mode: WalkMode::Recursive }
    }

    pub fn single_level(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), mode: WalkMode::SingleLevel }
    }
}

/// Counters of one scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Paths produced by walking the sources.
    pub discovered: usize,
    /// Paths that were admitted into the index.
    pub registered: usize,
    /// Entries whose every enrichment hook succeeded.
    pub enriched: usize,
    /// Entries with at least one failed enrichment hook.
    pub failed: usize,
    /// Directories or sources that could not be read.
    pub unreadable: usize,
}

#[derive(Default)]
struct WorkerSummary {
    enriched: usize,
    failed: usize,
}

/// Fills a shared index from a list of sources.
#[derive(Clone, Debug)]
pub struct Scanner {
    workers: usize,
    include_directories: bool,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(default_workers())
    }
}

impl Scanner {
    /// A scanner with `workers` enrichment workers (at least one).
    pub fn new(workers: usize) -> Self {
        Self { workers: workers.max(1), include_directories: false }
    }

    /// Also index the directories met while walking.
    pub fn with_directories(mut self, include_directories: bool) -> Self {
        self.include_directories = include_directories;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    #[tracing::instrument(skip_all, fields(workers = self.workers, sources = sources.len()))]
    pub async fn scan(&self, index: &Arc<Mutex<FileIndex>>, sources: &[Source]) -> ScanSummary {
        let (sender, receiver) = mpsc::channel::<EntryId>(self.workers * 2);
        let receiver = Arc::new(Mutex::new(receiver));

        let workers: FuturesUnordered<_> =
            (0..self.workers).map(|_| Self::work(Arc::clone(index), Arc::clone(&receiver))).collect();
        let (mut summary, worked) =
            futures::future::join(self.produce(index, sources, sender), workers.collect::<Vec<_>>()).await;

        for worker in worked {
            summary.enriched += worker.enriched;
            summary.failed += worker.failed;
        }
        tracing::info!(
            discovered = summary.discovered,
            registered = summary.registered,
            failed = summary.failed,
            unreadable = summary.unreadable,
            "Scan complete"
        );
        summary
    }

    /// Walk every source and queue the admitted entries. Dropping `sender`
    /// on return closes the queue.
    async fn produce(&self, index: &Mutex<FileIndex>, sources: &[Source], sender: mpsc::Sender<EntryId>) -> ScanSummary {
        let mut summary = ScanSummary::default();
        let (admission, backend, action) = {
            let index = index.lock().await;
            (index.admission(), Arc::clone(index.backend()), index.settings().default_action)
        };

        for source in sources {
            // A file given as a source is indexed on its own.
            let mut paths: PathStream<'_> = match backend.is_file(&source.path).await {
                Ok(true) => futures::stream::once(async { Ok(source.path.clone()) }).boxed(),
                _ => backend.walk(&source.path, source.mode, self.include_directories),
            };
            while let Some(path) = paths.next().await {
                let path = match path {
                    Ok(path) => path,
                    Err(err) => {
                        tracing::warn!(source = %source.path.display(), "Skipping unreadable path: {}", *err);
                        summary.unreadable += 1;
                        continue;
                    },
                };
                summary.discovered += 1;
                let Some(path) = admission.admit(&path).await else {
                    continue;
                };
                let id = index.lock().await.insert(path, action);
                summary.registered += 1;
                if sender.send(id).await.is_err() {
                    tracing::error!("Enrichment workers stopped early");
                    return summary;
                }
            }
        }
        summary
    }

    async fn work(index: Arc<Mutex<FileIndex>>, queue: Arc<Mutex<mpsc::Receiver<EntryId>>>) -> WorkerSummary {
        let mut summary = WorkerSummary::default();
        loop {
            let Some(id) = queue.lock().await.recv().await else {
                break;
            };
            let (entry, pipeline) = {
                let index = index.lock().await;
                match index.get(id) {
                    Some(entry) => (entry.clone(), index.pipeline().clone()),
                    None => continue,
                }
            };
            let enriched = pipeline.enrich(entry).await;
            match enriched.failures {
                0 => summary.enriched += 1,
                _ => summary.failed += 1,
            }
            index.lock().await.commit(enriched.entry);
        }
        summary
    }
}
