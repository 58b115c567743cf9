//! User interaction: yes/no questions and messages.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};
use tokio::sync::Mutex;

/// Where questions are asked and messages shown.
#[async_trait]
pub trait Console: Send + Sync {
    /// Ask a yes/no question. Anything but an explicit "yes" is a "no".
    async fn confirm(&self, prompt: &str) -> bool;

    fn error(&self, message: &str);

    fn warning(&self, message: &str);

    fn info(&self, message: &str);
}

/// Whether an answer to a `[y/N]` question accepts it.
pub fn accepts(answer: &str) -> bool {
    answer.starts_with(['y', 'Y'])
}

/// Questions on stdout, answers from stdin, errors and warnings on stderr.
pub struct TerminalConsole {
    stdin: Mutex<BufReader<Stdin>>,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self { stdin: Mutex::new(BufReader::new(tokio::io::stdin())) }
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for TerminalConsole {
    async fn confirm(&self, prompt: &str) -> bool {
        let question = format!("{prompt} [y/N]: ");
        let mut stdout = tokio::io::stdout();
        if let Err(err) = stdout.write_all(question.as_bytes()).await {
            tracing::warn!(error = %err, "Could not ask for confirmation");
            return false;
        }
        let _ = stdout.flush().await;

        let mut answer = String::new();
        match self.stdin.lock().await.read_line(&mut answer).await {
            // End of input counts as "no".
            Ok(0) => false,
            Ok(_) => accepts(&answer),
            Err(err) => {
                tracing::warn!(error = %err, "Could not read the answer");
                false
            },
        }
    }

    fn error(&self, message: &str) {
        eprintln!("ERROR: {message}");
    }

    fn warning(&self, message: &str) {
        eprintln!("WARNING: {message}");
    }

    fn info(&self, message: &str) {
        println!("{message}");
    }
}
