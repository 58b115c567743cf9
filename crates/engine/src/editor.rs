//! Round-tripping the plan through an external text editor.

use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::{OptionExt, ResultExt};
use std::io::Write;

/// Editor used when neither the configuration nor `$EDITOR` names one.
pub const DEFAULT_EDITOR: &str = "vi";

/// Lets the user change a piece of text.
#[async_trait]
pub trait Editor: Send + Sync {
    /// Returns the text as the user left it.
    async fn edit(&self, text: &str) -> Result<String>;
}

/// Runs an editor command on a temporary file holding the text.
///
/// The command is split on whitespace; the first word is resolved on `PATH`
/// and the file path is appended as the last argument.
#[derive(Clone, Debug)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into() }
    }

    /// The editor named by `$EDITOR`, falling back to [`DEFAULT_EDITOR`].
    pub fn from_env() -> Self {
        match std::env::var("EDITOR") {
            Ok(command) if !command.trim().is_empty() => Self::new(command),
            _ => Self::new(DEFAULT_EDITOR),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

#[async_trait]
impl Editor for ExternalEditor {
    #[tracing::instrument(skip_all, fields(editor = %self.command))]
    async fn edit(&self, text: &str) -> Result<String> {
        let mut words = self.command.split_whitespace();
        let program = words.next().ok_or_raise(|| ErrorKind::EditorNotFound(self.command.clone()))?;
        let program = which::which(program).or_raise(|| ErrorKind::EditorNotFound(program.to_string()))?;

        let mut file = tempfile::Builder::new()
            .prefix("ifs-")
            .suffix(".txt")
            .tempfile()
            .or_raise(|| ErrorKind::PlanFile)?;
        file.write_all(text.as_bytes()).or_raise(|| ErrorKind::PlanFile)?;
        file.flush().or_raise(|| ErrorKind::PlanFile)?;

        tracing::debug!(program = %program.display(), file = %file.path().display(), "Launching editor");
        let status = tokio::process::Command::new(&program)
            .args(words)
            .arg(file.path())
            .status()
            .await
            .or_raise(|| ErrorKind::EditorNotFound(program.display().to_string()))?;
        if !status.success() {
            exn::bail!(ErrorKind::EditorFailed(status.to_string()));
        }

        // Read by path: editors that save by renaming leave the handle stale.
        tokio::fs::read_to_string(file.path()).await.or_raise(|| ErrorKind::PlanFile)
    }
}
