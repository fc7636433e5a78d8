use ollama_rs::Ollama;
use ollama_rs::generation::chat::ChatMessage;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use ollama_rs::generation::embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest};
use ollama_rs::models::ModelOptions;

use crate::error::LlmError;
use crate::provider::{LlmProvider, Message, Role};

/// Answers and embeddings from a local Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Ollama,
    chat_model: String,
    embedding_model: String,
    options: ModelOptions,
}

impl OllamaProvider {
    /// # Errors
    ///
    /// Returns `LlmError::Other` when `base_url` is not a valid URL.
    pub fn new(
        base_url: &str,
        chat_model: String,
        embedding_model: String,
    ) -> Result<Self, LlmError> {
        let client = Ollama::try_new(base_url)
            .map_err(|e| LlmError::Other(format!("invalid Ollama URL {base_url:?}: {e}")))?;
        Ok(Self {
            client,
            chat_model,
            embedding_model,
            options: ModelOptions::default(),
        })
    }

    /// Sampling temperature and answer length limit sent with every chat request.
    #[must_use]
    pub fn with_generation(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.options = ModelOptions::default()
            .temperature(temperature)
            .num_predict(i32::try_from(max_tokens).unwrap_or(i32::MAX));
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.client.url_str()
    }

    /// Verify the server answers and both configured models are installed.
    ///
    /// A missing model is only logged; Ollama may still pull it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be reached.
    pub async fn health_check(&self) -> Result<(), LlmError> {
        let installed = self.client.list_local_models().await.map_err(|e| {
            LlmError::Other(format!(
                "Ollama is not reachable at {}: {e}",
                self.base_url()
            ))
        })?;
        for wanted in [&self.chat_model, &self.embedding_model] {
            if !installed.iter().any(|m| model_matches(&m.name, wanted)) {
                tracing::warn!(model = %wanted, "model is not installed in Ollama");
            }
        }
        Ok(())
    }
}

impl LlmProvider for OllamaProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        let request = ChatMessageRequest::new(
            self.chat_model.clone(),
            messages.iter().map(to_ollama).collect(),
        )
        .options(self.options.clone());

        let reply = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| LlmError::Other(format!("Ollama chat failed: {e}")))?;
        if reply.message.content.trim().is_empty() {
            return Err(LlmError::EmptyResponse { provider: "ollama" });
        }
        Ok(reply.message.content)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let request =
            GenerateEmbeddingsRequest::new(self.embedding_model.clone(), EmbeddingsInput::from(text));
        let mut reply = self
            .client
            .generate_embeddings(request)
            .await
            .map_err(|e| LlmError::Other(format!("Ollama embedding failed: {e}")))?;
        if reply.embeddings.is_empty() {
            return Err(LlmError::EmptyResponse { provider: "ollama" });
        }
        Ok(reply.embeddings.swap_remove(0))
    }

    fn supports_embeddings(&self) -> bool {
        true
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ollama"
    }
}

fn to_ollama(message: &Message) -> ChatMessage {
    let content = message.content.clone();
    match message.role {
        Role::System => ChatMessage::system(content),
        Role::User => ChatMessage::user(content),
        Role::Assistant => ChatMessage::assistant(content),
    }
}

/// Ollama lists models with an explicit tag; a configured name without one means `latest`.
fn model_matches(installed: &str, wanted: &str) -> bool {
    if wanted.contains(':') {
        installed == wanted
    } else {
        installed == wanted || installed.strip_suffix(":latest") == Some(wanted)
    }
}
