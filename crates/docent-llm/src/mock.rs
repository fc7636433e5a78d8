//! Test-only mock LLM provider.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::provider::{LlmProvider, Message};

/// Deterministic text-to-vector function used in place of a real embedding model.
pub type Embedder = Arc<dyn Fn(&str) -> Vec<f32> + Send + Sync>;

/// Per-request chat latency, chosen from the prompt.
pub type ChatLatency = Arc<dyn Fn(&[Message]) -> Duration + Send + Sync>;

#[derive(Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<Vec<Message>>>>,
    embedder: Option<Embedder>,
    chat_latency: Option<ChatLatency>,
    pub default_response: String,
    pub embedding: Vec<f32>,
    pub supports_embeddings: bool,
    pub fail_chat: bool,
    pub fail_embed: bool,
    /// Milliseconds to sleep before returning a response.
    pub delay_ms: u64,
}

impl fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockProvider")
            .field("default_response", &self.default_response)
            .field("embedding_dim", &self.embedding.len())
            .field("embedder", &self.embedder.as_ref().map(|_| "<fn>"))
            .field("chat_latency", &self.chat_latency.as_ref().map(|_| "<fn>"))
            .field("supports_embeddings", &self.supports_embeddings)
            .field("fail_chat", &self.fail_chat)
            .field("fail_embed", &self.fail_embed)
            .field("delay_ms", &self.delay_ms)
            .finish_non_exhaustive()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            embedder: None,
            chat_latency: None,
            default_response: "mock response".into(),
            embedding: vec![0.0; 8],
            supports_embeddings: true,
            fail_chat: false,
            fail_embed: false,
            delay_ms: 0,
        }
    }
}

impl MockProvider {
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_chat: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_embedder(mut self, embedder: impl Fn(&str) -> Vec<f32> + Send + Sync + 'static) -> Self {
        self.embedder = Some(Arc::new(embedder));
        self.supports_embeddings = true;
        self
    }

    #[must_use]
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    #[must_use]
    pub fn with_embed_failure(mut self) -> Self {
        self.fail_embed = true;
        self
    }

    /// Sleep for `latency(messages)` in every `chat` call, after the fixed delay.
    #[must_use]
    pub fn with_chat_latency(
        mut self,
        latency: impl Fn(&[Message]) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.chat_latency = Some(Arc::new(latency));
        self
    }

    /// Every message list passed to `chat`, oldest first.
    #[must_use]
    pub fn recorded_prompts(&self) -> Vec<Vec<Message>> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LlmProvider for MockProvider {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(&self, messages: &[Message]) -> Result<String, crate::LlmError> {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
        if let Some(latency) = &self.chat_latency {
            tokio::time::sleep(latency(messages)).await;
        }
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(messages.to_vec());
        if self.fail_chat {
            return Err(crate::LlmError::Other("mock LLM error".into()));
        }
        let mut responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
        if responses.is_empty() {
            Ok(self.default_response.clone())
        } else {
            Ok(responses.remove(0))
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, crate::LlmError> {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
        if !self.supports_embeddings {
            return Err(crate::LlmError::EmbedUnsupported { provider: "mock" });
        }
        if self.fail_embed {
            return Err(crate::LlmError::Other("mock embedding error".into()));
        }
        Ok(match &self.embedder {
            Some(embedder) => embedder(text),
            None => self.embedding.clone(),
        })
    }

    fn supports_embeddings(&self) -> bool {
        self.supports_embeddings
    }
}
