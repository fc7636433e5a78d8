use std::collections::VecDeque;
use std::io::IsTerminal;

use crossterm::style::Stylize;
use docent_core::channel::{Channel, ChannelError, ChannelMessage};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::line_editor::{self, ReadLineResult};

pub const PROMPT: &str = "Enter your question (or type \"exit\" to quit): ";

const MAX_HISTORY: usize = 1000;

#[derive(Debug, Default)]
struct InputHistory {
    entries: VecDeque<String>,
}

impl InputHistory {
    fn snapshot(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    fn add(&mut self, line: &str) {
        if line.is_empty() || self.entries.back().is_some_and(|last| last == line) {
            return;
        }
        if self.entries.len() == MAX_HISTORY {
            self.entries.pop_front();
        }
        self.entries.push_back(line.to_owned());
    }
}

enum Input {
    /// Raw-mode line editor on a terminal.
    Editor,
    /// Line-by-line reads from redirected stdin; each question is echoed after the prompt.
    Piped(Lines<BufReader<Stdin>>),
}

impl std::fmt::Debug for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Editor => f.write_str("Editor"),
            Self::Piped(_) => f.write_str("Piped"),
        }
    }
}

/// Terminal channel: questions from stdin, answers to stdout.
#[derive(Debug)]
pub struct CliChannel {
    input: Input,
    history: InputHistory,
}

impl CliChannel {
    #[must_use]
    pub fn new() -> Self {
        let input = if std::io::stdin().is_terminal() {
            Input::Editor
        } else {
            Input::Piped(BufReader::new(tokio::io::stdin()).lines())
        };
        Self {
            input,
            history: InputHistory::default(),
        }
    }

    /// Whether questions are read through the interactive line editor.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        matches!(self.input, Input::Editor)
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel for CliChannel {
    async fn recv(&mut self) -> Result<Option<ChannelMessage>, ChannelError> {
        let line = match &mut self.input {
            Input::Editor => {
                let entries = self.history.snapshot();
                let result =
                    tokio::task::spawn_blocking(move || line_editor::read_line(PROMPT, &entries))
                        .await
                        .map_err(|e| ChannelError::Other(e.to_string()))?
                        .map_err(ChannelError::Io)?;
                match result {
                    ReadLineResult::Interrupted | ReadLineResult::Eof => return Ok(None),
                    ReadLineResult::Line(l) => l,
                }
            }
            Input::Piped(lines) => {
                let Some(l) = lines.next_line().await? else {
                    tracing::debug!("stdin closed");
                    return Ok(None);
                };
                println!("{}{}", PROMPT.yellow(), l.trim());
                l
            }
        };

        let text = line.trim().to_owned();
        self.history.add(&text);
        Ok(Some(ChannelMessage { text }))
    }

    async fn send(&mut self, text: &str) -> Result<(), ChannelError> {
        println!("{text}");
        Ok(())
    }

    async fn send_error(&mut self, message: &str) -> Result<(), ChannelError> {
        eprintln!("{}", format!("Error: {message}").red());
        Ok(())
    }
}
