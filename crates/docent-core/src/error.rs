use docent_corpus::{DocumentError, IndexError, SplitterError};

/// Startup failures that leave the service without an index.
#[derive(Debug, thiserror::Error)]
pub enum InitializationError {
    #[error("failed to load corpus: {0}")]
    Corpus(#[from] DocumentError),

    #[error("invalid chunking configuration: {0}")]
    Splitter(#[from] SplitterError),

    #[error("failed to build embedding index: {0}")]
    Index(#[from] IndexError),
}

/// Per-question failures. None of them affect later questions.
#[derive(Debug, thiserror::Error)]
pub enum AskError {
    #[error("the document index is not ready")]
    NotReady,

    #[error("embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("language model unavailable: {0}")]
    GenerationUnavailable(String),
}
