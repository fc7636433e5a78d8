pub mod corpus;
pub mod error;
pub mod loader;
pub mod registry;
pub mod splitter;
pub mod types;

pub use corpus::{CorpusLoader, LoadFailure, LoadReport};
pub use error::{DocumentError, SplitterError};
pub use loader::{CsvLoader, JsonLoader, NotionLoader, TextLoader};
pub use registry::{LoaderRegistry, UnknownHandling};
pub use splitter::{SplitterConfig, TextSplitter};
pub use types::{Chunk, Document, DocumentFormat, DocumentMetadata, SourceFile};

#[cfg(feature = "pdf")]
pub use loader::PdfLoader;

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

pub trait DocumentLoader: Send + Sync {
    fn load<'a>(
        &'a self,
        file: &'a SourceFile,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<Document>, DocumentError>> + Send + 'a>,
    >;

    fn supported_extensions(&self) -> &[&str];
}
