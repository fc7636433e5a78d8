//! Corpus ingestion for Docent: multi-format document loading, recursive chunking and an
//! in-memory embedding index.

pub mod document;
pub mod error;
pub mod index;

pub use document::{
    Chunk, CorpusLoader, Document, DocumentError, DocumentFormat, DocumentMetadata, LoadReport,
    LoaderRegistry, SplitterConfig, SplitterError, TextSplitter, UnknownHandling,
};
pub use error::IndexError;
pub use index::{CorpusIndex, ScoredChunk, VectorIndex};
