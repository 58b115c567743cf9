//! Scanning, plan editing and execution rounds.
//!
//! A run goes through three stages:
//!
//! 1. [`Scanner`] fills the index from the command-line sources, with
//!    enrichment hooks running on a pool of workers.
//! 2. [`Session`] renders the index as a plan, hands it to an [`Editor`] and
//!    applies the edited plan back onto the index.
//! 3. [`Executor`] performs the pending operations, asking the [`Console`]
//!    for confirmation, and leaves remarks on whatever it could not do.
//!
//! Stages 2 and 3 repeat in multi-stage mode until every entry is resolved.

pub mod console;
pub mod editor;
pub mod error;
mod execute;
mod scan;
mod session;

pub use crate::console::{Console, TerminalConsole};
pub use crate::editor::{Editor, ExternalEditor};
pub use crate::execute::{ExecuteOptions, ExecutionSummary, Executor};
pub use crate::scan::{ScanSummary, Scanner, Source, default_workers};
pub use crate::session::{Session, SessionOptions, SessionSummary};
