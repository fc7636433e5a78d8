mod csv;
mod json;
mod notion;
#[cfg(feature = "pdf")]
mod pdf;
mod text;

use std::path::{Path, PathBuf};

pub use self::csv::CsvLoader;
pub use self::json::JsonLoader;
pub use self::notion::NotionLoader;
#[cfg(feature = "pdf")]
pub use self::pdf::PdfLoader;
pub use self::text::TextLoader;

use super::DocumentError;

/// Canonicalize `path`, reject files over `max_size`, then read the file as UTF-8.
async fn read_checked(path: &Path, max_size: u64) -> Result<(PathBuf, String), DocumentError> {
    let path = tokio::fs::canonicalize(path).await?;
    check_size(&path, max_size).await?;
    let content = tokio::fs::read_to_string(&path).await?;
    Ok((path, content))
}

async fn check_size(path: &Path, max_size: u64) -> Result<(), DocumentError> {
    let meta = tokio::fs::metadata(path).await?;
    if meta.len() > max_size {
        return Err(DocumentError::FileTooLarge(meta.len()));
    }
    Ok(())
}
