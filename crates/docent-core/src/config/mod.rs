mod env;
mod types;

#[cfg(test)]
mod tests;

pub use types::*;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Check bounds that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.corpus.chunk_size == 0 {
            bail!("corpus.chunk_size must be at least 1");
        }
        if self.corpus.chunk_overlap >= self.corpus.chunk_size {
            bail!(
                "corpus.chunk_overlap ({}) must be smaller than corpus.chunk_size ({})",
                self.corpus.chunk_overlap,
                self.corpus.chunk_size
            );
        }
        if self.retrieval.top_k == 0 {
            bail!("retrieval.top_k must be at least 1");
        }
        if self.retrieval.embed_concurrency == 0 {
            bail!("retrieval.embed_concurrency must be at least 1");
        }
        if self.timeouts.llm_seconds == 0 || self.timeouts.embedding_seconds == 0 {
            bail!("timeouts must be greater than zero");
        }
        if self.llm.provider == ProviderKind::OpenAi && self.secrets.openai_api_key.is_none() {
            bail!("llm.provider = \"openai\" requires DOCENT_OPENAI_API_KEY or OPENAI_API_KEY");
        }
        Ok(())
    }

    #[must_use]
    pub fn openai(&self) -> OpenAiConfig {
        self.llm.openai.clone().unwrap_or_default()
    }
}

impl TimeoutConfig {
    #[must_use]
    pub fn llm(&self) -> Duration {
        Duration::from_secs(self.llm_seconds)
    }

    #[must_use]
    pub fn embedding(&self) -> Duration {
        Duration::from_secs(self.embedding_seconds)
    }
}
