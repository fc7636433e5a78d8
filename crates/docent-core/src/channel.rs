use std::future::Future;

use crate::attribution::display_source;
use crate::qa::Answer;

/// Typed error for channel operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel closed.
    #[error("channel closed")]
    ChannelClosed,

    #[error("{0}")]
    Other(String),
}

/// Incoming message from a channel.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    pub text: String,
}

/// Question/answer exchange with a user.
pub trait Channel: Send {
    /// Receive the next question. Returns `None` on EOF or shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying I/O fails.
    fn recv(&mut self)
    -> impl Future<Output = Result<Option<ChannelMessage>, ChannelError>> + Send;

    /// Send a text response.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying I/O fails.
    fn send(&mut self, text: &str) -> impl Future<Output = Result<(), ChannelError>> + Send;

    /// Send an answer with its source attribution.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying I/O fails.
    fn send_answer(
        &mut self,
        answer: &Answer,
    ) -> impl Future<Output = Result<(), ChannelError>> + Send {
        let text = format_answer(answer);
        async move { self.send(&text).await }
    }

    /// Report a failed question. Defaults to a plain send.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying I/O fails.
    fn send_error(&mut self, message: &str) -> impl Future<Output = Result<(), ChannelError>> + Send {
        let text = format!("Error: {message}");
        async move { self.send(&text).await }
    }
}

/// Plain-text rendering of an answer: the answer line followed by the source line.
#[must_use]
pub fn format_answer(answer: &Answer) -> String {
    let source = answer
        .source_documents
        .first()
        .map_or("none", |c| display_source(&c.metadata.source));
    format!("AI answered: {}\nSource Document: {source}", answer.text.trim())
}

#[cfg(test)]
mod tests {
    use docent_corpus::{Chunk, DocumentFormat, DocumentMetadata};

    use super::*;

    #[test]
    fn format_answer_with_source() {
        let answer = Answer {
            text: "Blue.\n".into(),
            source_documents: vec![Chunk {
                content: "The sky is blue.".into(),
                metadata: DocumentMetadata::new("/srv/data/notes.txt", DocumentFormat::Text),
                chunk_index: 0,
            }],
        };
        assert_eq!(
            format_answer(&answer),
            "AI answered: Blue.\nSource Document: notes.txt"
        );
    }

    #[test]
    fn format_answer_without_source() {
        let answer = Answer {
            text: "I don't know.".into(),
            source_documents: Vec::new(),
        };
        assert!(format_answer(&answer).ends_with("Source Document: none"));
    }
}
