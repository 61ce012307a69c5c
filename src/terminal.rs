//! Stdin/stderr prompter for interactive commands.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use banner_comments::commands::{PickItem, Prompter};

/// Prompts on stderr and reads answers line by line from stdin.
///
/// An empty answer to a pick, or end of input, counts as dismissing the
/// prompt.
pub struct TerminalPrompter {
    lines: Lines<BufReader<Stdin>>,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn read_line(&mut self) -> Option<String> {
        match self.lines.next_line().await {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!("Failed to read from stdin: {}", err);
                None
            }
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl Prompter for TerminalPrompter {
    async fn pick(&mut self, placeholder: &str, items: Vec<PickItem>) -> Option<PickItem> {
        if items.is_empty() {
            eprintln!("Nothing to choose from for {}", placeholder);
            return None;
        }

        eprintln!("{}:", placeholder);
        for (index, item) in items.iter().enumerate() {
            if item.description.is_empty() {
                eprintln!("  {:>3}) {}", index + 1, item.label);
            } else {
                eprintln!("  {:>3}) {}  ({})", index + 1, item.label, item.description);
            }
        }
        eprint!("Choose a number or label (empty to cancel): ");

        let answer = self.read_line().await?;
        let answer = answer.trim();
        if answer.is_empty() {
            return None;
        }

        match answer.parse::<usize>() {
            Ok(number) if (1..=items.len()).contains(&number) => items.into_iter().nth(number - 1),
            _ => items.into_iter().find(|item| item.label == answer),
        }
    }

    async fn input(&mut self, prompt: &str) -> Option<String> {
        eprint!("{}: ", prompt);
        self.read_line().await
    }

    fn show_info(&mut self, message: &str) {
        eprintln!("{}", message);
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("error: {}", message);
    }
}
