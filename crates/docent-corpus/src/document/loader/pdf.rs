use std::pin::Pin;

use super::super::{
    DEFAULT_MAX_FILE_SIZE, Document, DocumentError, DocumentFormat, DocumentLoader,
    DocumentMetadata, SourceFile,
};

/// Extracts text page by page; blank pages are skipped and `page` is 1-based.
pub struct PdfLoader {
    pub max_file_size: u64,
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for PdfLoader {
    fn load<'a>(
        &'a self,
        file: &'a SourceFile,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<Document>, DocumentError>> + Send + 'a>>
    {
        Box::pin(async move {
            let path = tokio::fs::canonicalize(&file.path).await?;
            super::check_size(&path, self.max_file_size).await?;

            let source = path.display().to_string();
            let pages = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_by_pages(&path)
                    .map_err(|e| DocumentError::Pdf(e.to_string()))
            })
            .await
            .map_err(|e| DocumentError::Io(std::io::Error::other(e)))??;

            Ok(pages
                .into_iter()
                .enumerate()
                .filter(|(_, text)| !text.trim().is_empty())
                .map(|(i, content)| Document {
                    content,
                    metadata: DocumentMetadata::new(source.clone(), DocumentFormat::Pdf)
                        .with_extra("page", (i + 1).to_string()),
                })
                .collect())
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn corrupt_pdf_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.pdf");
        std::fs::write(&file, b"not a pdf at all").unwrap();

        let result = PdfLoader::default()
            .load(&SourceFile::new(&file, "broken.pdf"))
            .await;
        assert!(matches!(result, Err(DocumentError::Pdf(_))));
    }

    #[tokio::test]
    async fn size_limit_checked_before_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("big.pdf");
        std::fs::write(&file, b"%PDF-1.4").unwrap();

        let loader = PdfLoader { max_file_size: 1 };
        let result = loader.load(&SourceFile::new(&file, "big.pdf")).await;
        assert!(matches!(result, Err(DocumentError::FileTooLarge(_))));
    }

    #[test]
    fn supports_pdf_extension() {
        assert_eq!(PdfLoader::default().supported_extensions(), &["pdf"]);
    }
}
