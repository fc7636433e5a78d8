use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use docent_corpus::{
    CorpusIndex, CorpusLoader, LoaderRegistry, SplitterConfig, TextSplitter,
};
use docent_llm::provider::{EmbedFuture, embed_fn};
use docent_llm::{LlmError, LlmProvider};
use serde::Serialize;

use crate::config::Config;
use crate::error::{AskError, InitializationError};
use crate::qa::{Answer, QaSettings, RetrievalQa};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    Initializing,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub documents: usize,
    pub chunks: usize,
    pub failed_files: usize,
    pub ignored_files: usize,
    pub dimension: Option<usize>,
}

pub type AskFuture<'a> = Pin<Box<dyn Future<Output = Result<Answer, AskError>> + Send + 'a>>;

/// Object-safe view of a question-answering service for front ends.
pub trait QuestionAnswerer: Send + Sync {
    fn ask<'a>(&'a self, question: &'a str) -> AskFuture<'a>;

    fn readiness(&self) -> Readiness;
}

struct ServiceState {
    readiness: Readiness,
    index: Option<Arc<CorpusIndex>>,
}

/// Owns the corpus index and answers questions against it.
///
/// The index is built once by [`RagService::initialize`]; questions asked before that
/// fail with [`AskError::NotReady`].
pub struct RagService<P> {
    provider: Arc<P>,
    qa: RetrievalQa<P>,
    registry: LoaderRegistry,
    embed_concurrency: usize,
    state: RwLock<ServiceState>,
}

impl<P> std::fmt::Debug for RagService<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("RagService")
            .field("readiness", &state.readiness)
            .field("chunks", &state.index.as_ref().map(|i| i.len()))
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl<P: LlmProvider + 'static> RagService<P> {
    #[must_use]
    pub fn new(
        provider: Arc<P>,
        settings: QaSettings,
        registry: LoaderRegistry,
        embed_concurrency: usize,
    ) -> Self {
        Self {
            qa: RetrievalQa::new(Arc::clone(&provider), settings),
            provider,
            registry,
            embed_concurrency: embed_concurrency.max(1),
            state: RwLock::new(ServiceState {
                readiness: Readiness::Initializing,
                index: None,
            }),
        }
    }

    #[must_use]
    pub fn from_config(provider: Arc<P>, config: &Config) -> Self {
        Self::new(
            provider,
            QaSettings::from_config(config),
            LoaderRegistry::with_defaults(config.corpus.max_file_size, config.corpus.unknown_files),
            config.retrieval.embed_concurrency,
        )
    }

    /// Load, chunk and embed the corpus under `root`, then mark the service ready.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError` if the chunking configuration is invalid, `root` cannot be
    /// read, or any embedding fails. The service is then left in [`Readiness::Failed`].
    pub async fn initialize(
        &self,
        root: &Path,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<IndexStats, InitializationError> {
        match self.build_index(root, chunk_size, chunk_overlap).await {
            Ok((index, stats)) => {
                self.install(index, Readiness::Ready);
                tracing::info!(
                    documents = stats.documents,
                    chunks = stats.chunks,
                    failed_files = stats.failed_files,
                    "document index ready"
                );
                Ok(stats)
            }
            Err(e) => {
                self.set_readiness(Readiness::Failed);
                tracing::error!("initialization failed: {e}");
                Err(e)
            }
        }
    }

    /// Build a fresh index and swap it in. In-flight questions keep using the old one.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError` on failure; the current index stays in place.
    pub async fn rebuild(
        &self,
        root: &Path,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<IndexStats, InitializationError> {
        let (index, stats) = self.build_index(root, chunk_size, chunk_overlap).await?;
        self.install(index, Readiness::Ready);
        tracing::info!(chunks = stats.chunks, "document index rebuilt");
        Ok(stats)
    }

    /// # Errors
    ///
    /// Returns `AskError::NotReady` before a successful initialization, otherwise whatever
    /// the retrieval-QA step reports.
    pub async fn ask(&self, question: &str) -> Result<Answer, AskError> {
        let index = self.current_index().ok_or(AskError::NotReady)?;
        self.qa.answer(&index, question).await
    }

    #[must_use]
    pub fn readiness(&self) -> Readiness {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .readiness
    }

    #[must_use]
    pub fn current_index(&self) -> Option<Arc<CorpusIndex>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .index
            .clone()
    }

    async fn build_index(
        &self,
        root: &Path,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<(CorpusIndex, IndexStats), InitializationError> {
        let splitter = TextSplitter::new(SplitterConfig {
            chunk_size,
            chunk_overlap,
        })?;

        let report = CorpusLoader::new(self.registry.clone()).load(root).await?;
        let chunks = splitter.split_all(&report.documents);

        let mut stats = IndexStats {
            documents: report.documents.len(),
            chunks: chunks.len(),
            failed_files: report.failures.len(),
            ignored_files: report.ignored.len(),
            dimension: None,
        };

        let embed = timed_embed(
            embed_fn(Arc::clone(&self.provider)),
            self.qa.settings().embed_timeout,
        );
        let index = CorpusIndex::build(chunks, embed, self.embed_concurrency).await?;
        stats.dimension = index.dimension();
        Ok((index, stats))
    }

    fn install(&self, index: CorpusIndex, readiness: Readiness) {
        let index = Arc::new(index);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.index = Some(index);
        state.readiness = readiness;
    }

    fn set_readiness(&self, readiness: Readiness) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .readiness = readiness;
    }
}

impl<P: LlmProvider + 'static> QuestionAnswerer for RagService<P> {
    fn ask<'a>(&'a self, question: &'a str) -> AskFuture<'a> {
        Box::pin(RagService::ask(self, question))
    }

    fn readiness(&self) -> Readiness {
        RagService::readiness(self)
    }
}

fn timed_embed<F>(embed: F, limit: Duration) -> impl Fn(&str) -> EmbedFuture
where
    F: Fn(&str) -> EmbedFuture,
{
    move |text: &str| -> EmbedFuture {
        let fut = embed(text);
        Box::pin(async move {
            match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => Err(LlmError::Other(format!(
                    "embedding timed out after {}s",
                    limit.as_secs()
                ))),
            }
        })
    }
}
