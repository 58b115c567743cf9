//! The interactive loop: show the plan, let the user edit it, carry it out.

use crate::console::Console;
use crate::editor::Editor;
use crate::error::{ErrorKind, Result};
use crate::execute::{ExecuteOptions, Executor};
use ifs_index::FileIndex;
use ifs_plan::{Plan, render};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Keep editing rounds going while files remain unprocessed.
    pub multistage: bool,
    pub execute: ExecuteOptions,
}

/// What a whole session did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Editor rounds run.
    pub rounds: usize,
    /// Operations performed over all rounds.
    pub applied: usize,
    /// Entries left with pending pairs.
    pub pending: usize,
}

pub struct Session<'a> {
    console: &'a dyn Console,
    editor: &'a dyn Editor,
    options: SessionOptions,
}

impl<'a> Session<'a> {
    pub fn new(console: &'a dyn Console, editor: &'a dyn Editor, options: SessionOptions) -> Self {
        Self { console, editor, options }
    }

    /// Run editing rounds over a fully scanned index until nothing is left
    /// to do or the user stops.
    ///
    /// # Errors
    /// Fails if the editor cannot be run, or if the user declines to fix a
    /// plan that does not parse.
    pub async fn run(&self, index: &mut FileIndex) -> Result<SessionSummary> {
        let mut summary = SessionSummary::default();
        loop {
            index.complete();
            if index.is_empty() {
                tracing::info!("No files to process");
                break;
            }

            summary.rounds += 1;
            let plan = self.edit(render(index)).await?;
            let added = plan.apply(index).await;
            for entry in added.iter().filter_map(|id| index.get(*id)) {
                self.console.warning(&format!(
                    "Unknown entry {} in the plan, \"{}\" was added as a new file",
                    entry.id(),
                    entry.current_name().display()
                ));
            }
            tracing::debug!(round = summary.rounds, added = added.len(), entries = index.len(), "Plan applied");

            let executed = Executor::new(self.console, self.options.execute).execute(index).await;
            summary.applied += executed.applied;
            summary.pending = executed.pending;
            if executed.pending == 0 {
                break;
            }

            if !self.options.multistage {
                self.console.info(&format!("{} files not processed", executed.pending));
                self.console.info(render(index).trim_end());
                break;
            }
            if executed.applied > 0 {
                self.console.info(&format!(
                    "{} operations done, {} files not processed, launching the editor again",
                    executed.applied, executed.pending
                ));
                continue;
            }
            let question = format!("No operations done, still {} files not processed. Continue?", executed.pending);
            if !self.console.confirm(&question).await {
                break;
            }
        }
        Ok(summary)
    }

    /// Open the editor until its output parses.
    async fn edit(&self, text: String) -> Result<Plan> {
        let mut text = text;
        loop {
            text = self.editor.edit(&text).await?;
            let err = match Plan::parse(&text) {
                Ok(plan) => return Ok(plan),
                Err(err) => err,
            };
            tracing::warn!(error = ?err, "Edited plan does not parse");
            self.console.error(&(*err).to_string());
            if !self.console.confirm("Open the editor again to fix the plan?").await {
                let reason = (*err).to_string();
                return Err(err.raise(ErrorKind::InvalidPlan(reason)));
            }
        }
    }
}
