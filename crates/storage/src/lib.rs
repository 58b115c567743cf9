pub mod backend;
pub mod error;
mod path;

pub use crate::backend::{StorageBackend, WalkMode};
pub use crate::path::{normalize, split as split_path};
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
