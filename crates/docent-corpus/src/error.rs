#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] docent_llm::LlmError),

    #[error("embedding dimension mismatch for {origin}: expected {expected}, got {found}")]
    DimensionMismatch {
        origin: String,
        expected: usize,
        found: usize,
    },
}
