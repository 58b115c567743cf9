use crate::HEREDOC;
use crate::escape::unescape_path;
use crate::error::{ErrorKind, Result};
use ifs_index::{Action, EntryId, FileIndex};
use std::path::PathBuf;

/// One `<id> <action> <path>` line of an edited plan, plus the metadata
/// assignments that follow it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    /// Line number (1-based) of the action line.
    pub line: usize,
    /// The id as written; it may not name any entry.
    pub id: String,
    pub action: Action,
    pub path: PathBuf,
    pub metadata: Vec<(String, String)>,
}

impl Assignment {
    pub fn entry_id(&self) -> Option<EntryId> {
        self.id.parse().ok()
    }
}

/// A parsed plan, ready to be applied to the index it was rendered from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Plan {
    assignments: Vec<Assignment>,
}

/// Characters separating the fields of a plan line.
const SEPARATOR: [char; 2] = [' ', '\t'];

/// Split off the first token. The rest keeps everything after the separator
/// run, trailing whitespace included.
fn token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start_matches(SEPARATOR);
    let end = s.find(SEPARATOR).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    Some((&s[..end], s[end..].trim_start_matches(SEPARATOR)))
}

impl Plan {
    /// Parse edited plan text.
    ///
    /// Blank lines and `#` comments are skipped. Action lines are split on
    /// their first two tokens; the path is the rest of the line as written,
    /// with its escapes resolved. A line whose second token is `=` assigns
    /// metadata to the entry of the preceding action line.
    ///
    /// # Errors
    /// Returns the first malformed line: an unknown action character, a
    /// missing field, a bad escape in a path, metadata before any action
    /// line, or a multi-line value that is never closed.
    pub fn parse(text: &str) -> Result<Self> {
        let mut assignments: Vec<Assignment> = Vec::new();
        let mut lines = text.lines().enumerate().map(|(index, line)| (index + 1, line));
        while let Some((number, line)) = lines.next() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((first, rest)) = token(line) else {
                continue;
            };
            let Some((second, remainder)) = token(rest) else {
                let message = format!("expected \"<id> <action> <path>\", got \"{trimmed}\"");
                exn::bail!(ErrorKind::Syntax { line: number, message });
            };

            if second == "=" {
                let Some(current) = assignments.last_mut() else {
                    exn::bail!(ErrorKind::Syntax {
                        line: number,
                        message: format!("metadata \"{first}\" is not preceded by an action line"),
                    });
                };
                let value = if remainder.trim_end() == HEREDOC {
                    let mut value = Vec::new();
                    loop {
                        match lines.next() {
                            Some((_, line)) if line.trim_end() == HEREDOC => break,
                            Some((_, line)) => value.push(line),
                            None => exn::bail!(ErrorKind::UnterminatedValue { line: number, key: first.to_string() }),
                        }
                    }
                    value.join("\n")
                } else {
                    remainder.to_string()
                };
                current.metadata.push((first.to_string(), value));
                continue;
            }

            let action: Action = second
                .parse()
                .map_err(|err: ifs_index::error::Error| {
                    err.raise(ErrorKind::InvalidAction { line: number, action: second.to_string() })
                })?;
            if remainder.is_empty() {
                let message = format!("missing path after action \"{action}\"");
                exn::bail!(ErrorKind::Syntax { line: number, message });
            }
            let path = unescape_path(remainder)
                .map_err(|reason| exn::Exn::from(ErrorKind::InvalidPath { line: number, reason }))?;
            assignments.push(Assignment {
                line: number,
                id: first.to_string(),
                action,
                path,
                metadata: Vec::new(),
            });
        }
        Ok(Self { assignments })
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Replace the pending operations of every entry with the ones in this
    /// plan.
    ///
    /// Every entry is reset first, so entries the plan no longer mentions
    /// become resolved and are purged. A line naming an unknown id is a
    /// request to add its path as a new file. Returns the ids of entries
    /// added that way.
    pub async fn apply(self, index: &mut FileIndex) -> Vec<EntryId> {
        for entry in index.iter_mut() {
            entry.reset();
        }
        let mut added = Vec::new();
        for assignment in self.assignments {
            let id = match assignment.entry_id().filter(|id| index.contains(*id)) {
                Some(id) => {
                    if let Some(entry) = index.get_mut(id) {
                        entry.add_target(assignment.path, assignment.action);
                    }
                    id
                },
                None => {
                    tracing::warn!(
                        line = assignment.line,
                        id = %assignment.id,
                        path = %assignment.path.display(),
                        "Unknown entry id ignored; adding the path as a new file"
                    );
                    let Some(id) = index.add([&assignment.path], Some(assignment.action)).await.pop() else {
                        continue;
                    };
                    added.push(id);
                    id
                },
            };
            if let Some(entry) = index.get_mut(id) {
                for (key, value) in assignment.metadata {
                    entry.metadata_mut().set(key, value);
                }
            }
        }
        index.purge();
        added
    }
}
