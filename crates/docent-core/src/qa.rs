use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use docent_corpus::{Chunk, CorpusIndex, ScoredChunk};
use docent_llm::LlmProvider;
use docent_llm::provider::Message;
use serde::Serialize;

use crate::attribution::display_source;
use crate::config::Config;
use crate::error::AskError;

/// Context block sent to the model when retrieval finds nothing.
pub const NO_CONTEXT_MARKER: &str = "No relevant context was found in the document corpus.";

const SYSTEM_PROMPT: &str = "You answer questions about the user's documents. \
Use only the numbered context passages provided with the question. \
If the context does not contain the answer, say that the documents do not cover it \
instead of guessing.";

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,
    /// Retrieved fragments, best match first.
    pub source_documents: Vec<Chunk>,
}

impl Answer {
    /// Display path of the best-ranked source, if any.
    #[must_use]
    pub fn primary_source(&self) -> Option<&str> {
        self.source_documents
            .first()
            .map(|c| display_source(&c.metadata.source))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QaSettings {
    pub top_k: usize,
    pub embed_timeout: Duration,
    pub llm_timeout: Duration,
}

impl Default for QaSettings {
    fn default() -> Self {
        Self {
            top_k: 4,
            embed_timeout: Duration::from_secs(30),
            llm_timeout: Duration::from_secs(120),
        }
    }
}

impl QaSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            embed_timeout: config.timeouts.embedding(),
            llm_timeout: config.timeouts.llm(),
        }
    }
}

/// Embeds the question, retrieves the closest fragments and asks the model for a grounded answer.
///
/// Holds no per-question state, so one instance serves concurrent questions.
pub struct RetrievalQa<P> {
    provider: Arc<P>,
    settings: QaSettings,
}

impl<P> std::fmt::Debug for RetrievalQa<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalQa")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<P: LlmProvider> RetrievalQa<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, settings: QaSettings) -> Self {
        Self { provider, settings }
    }

    #[must_use]
    pub fn settings(&self) -> QaSettings {
        self.settings
    }

    /// # Errors
    ///
    /// Returns `AskError::EmbeddingUnavailable` or `AskError::GenerationUnavailable` when the
    /// corresponding provider call fails or exceeds its timeout.
    pub async fn answer(&self, index: &CorpusIndex, question: &str) -> Result<Answer, AskError> {
        let vector = tokio::time::timeout(self.settings.embed_timeout, self.provider.embed(question))
            .await
            .map_err(|_| {
                AskError::EmbeddingUnavailable(format!(
                    "timed out after {}s",
                    self.settings.embed_timeout.as_secs()
                ))
            })?
            .map_err(|e| AskError::EmbeddingUnavailable(e.to_string()))?;

        let hits = index.query(&vector, self.settings.top_k);
        tracing::debug!(
            hits = hits.len(),
            top_score = hits.first().map(|h| h.score),
            "retrieved context"
        );

        let messages = build_prompt(question, &hits);
        let text = tokio::time::timeout(self.settings.llm_timeout, self.provider.chat(&messages))
            .await
            .map_err(|_| {
                AskError::GenerationUnavailable(format!(
                    "timed out after {}s",
                    self.settings.llm_timeout.as_secs()
                ))
            })?
            .map_err(|e| AskError::GenerationUnavailable(e.to_string()))?;

        Ok(Answer {
            text,
            source_documents: hits.into_iter().map(|h| h.chunk).collect(),
        })
    }
}

/// Grounding prompt: system instruction, then numbered context passages and the question.
#[must_use]
pub fn build_prompt(question: &str, hits: &[ScoredChunk]) -> Vec<Message> {
    let mut user = String::from("Context:\n");
    if hits.is_empty() {
        user.push_str(NO_CONTEXT_MARKER);
        user.push('\n');
    }
    for (i, hit) in hits.iter().enumerate() {
        let _ = writeln!(user, "[{}] (source: {})", i + 1, source_label(&hit.chunk));
        user.push_str(hit.chunk.content.trim());
        user.push_str("\n\n");
    }
    let _ = write!(user, "\nQuestion: {}", question.trim());

    vec![Message::system(SYSTEM_PROMPT), Message::user(user)]
}

fn source_label(chunk: &Chunk) -> String {
    let extra = &chunk.metadata.extra;
    let mut label = match extra.get("path") {
        Some(path) => path.clone(),
        None => display_source(&chunk.metadata.source).to_owned(),
    };
    if let Some(page) = extra.get("page") {
        let _ = write!(label, ", page {page}");
    }
    if let Some(row) = extra.get("row") {
        let _ = write!(label, ", row {row}");
    }
    label
}
