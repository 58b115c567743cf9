//! The plain-text plan: how the index is shown to the user in an editor and
//! read back afterwards.
//!
//! ```text
//! # group 5d41402abc4b2a76b9719d911017c592
//! # Target file "b.txt" already exists. ...
//! 00000001 r   a.txt
//! 00000002 c   backup/a.txt
//! title = Something
//!
//! # ungrouped
//! 00000003 d   c.txt
//! ```
//!
//! Each action line is `<id> <action> <path>`; `key = value` lines below it
//! carry metadata (`key = <<END` starts a multi-line value closed by a
//! `<<END` line). Paths are escaped so each fits on its line exactly; see
//! [`escape_path()`].

pub mod error;
mod escape;
mod plan;
mod render;

pub use crate::escape::{escape_path, unescape_path};
pub use crate::plan::{Assignment, Plan};
pub use crate::render::{HEREDOC, render};
