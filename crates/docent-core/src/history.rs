use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub text: String,
    /// Set when the assistant could not produce an answer.
    #[serde(default)]
    pub failed: bool,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, text.into(), false)
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, text.into(), false)
    }

    #[must_use]
    pub fn failure(text: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, text.into(), true)
    }

    fn new(speaker: Speaker, text: String, failed: bool) -> Self {
        Self {
            speaker,
            text,
            failed,
            timestamp: Utc::now(),
        }
    }
}

/// Append-only conversation log that fans every new turn out to subscribers.
///
/// Appending and broadcasting happen under one lock, so every subscriber sees turns in
/// history order.
#[derive(Debug)]
pub struct ChatHistory {
    turns: Mutex<Vec<ChatTurn>>,
    tx: broadcast::Sender<ChatTurn>,
}

impl ChatHistory {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            turns: Mutex::new(Vec::new()),
            tx,
        }
    }

    /// Append `turn` and broadcast it to current subscribers.
    pub fn publish(&self, turn: ChatTurn) {
        let mut turns = self.turns.lock().unwrap_or_else(PoisonError::into_inner);
        turns.push(turn.clone());
        // no subscribers is fine
        let _ = self.tx.send(turn);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChatTurn> {
        self.tx.subscribe()
    }

    /// Current history plus a receiver for every turn published after it.
    #[must_use]
    pub fn subscribe_with_snapshot(&self) -> (Vec<ChatTurn>, broadcast::Receiver<ChatTurn>) {
        let turns = self.turns.lock().unwrap_or_else(PoisonError::into_inner);
        (turns.clone(), self.tx.subscribe())
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<ChatTurn> {
        self.turns
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new(256)
    }
}
