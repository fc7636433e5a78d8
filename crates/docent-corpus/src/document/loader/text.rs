use std::pin::Pin;

use super::super::{
    DEFAULT_MAX_FILE_SIZE, Document, DocumentError, DocumentFormat, DocumentLoader,
    DocumentMetadata, SourceFile,
};

pub struct TextLoader {
    pub max_file_size: u64,
}

impl Default for TextLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for TextLoader {
    fn load<'a>(
        &'a self,
        file: &'a SourceFile,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<Document>, DocumentError>> + Send + 'a>>
    {
        Box::pin(async move {
            let (path, content) = super::read_checked(&file.path, self.max_file_size).await?;
            Ok(vec![Document {
                content,
                metadata: DocumentMetadata::new(path.display().to_string(), DocumentFormat::Text),
            }])
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt"]
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn source(path: &Path) -> SourceFile {
        SourceFile::new(path, path.file_name().unwrap())
    }

    #[tokio::test]
    async fn load_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "The sky is blue.").unwrap();

        let docs = TextLoader::default().load(&source(&file)).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "The sky is blue.");
        assert_eq!(docs[0].metadata.format, DocumentFormat::Text);
    }

    #[tokio::test]
    async fn load_nonexistent_file() {
        let missing = Path::new("/nonexistent/file.txt");
        let result = TextLoader::default().load(&source(missing)).await;
        assert!(matches!(result, Err(DocumentError::Io(_))));
    }

    #[tokio::test]
    async fn load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("empty.txt");
        std::fs::write(&file, "").unwrap();

        let docs = TextLoader::default().load(&source(&file)).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].content.is_empty());
    }

    #[tokio::test]
    async fn metadata_source_is_canonical() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("test.txt");
        std::fs::write(&file, "data").unwrap();

        let docs = TextLoader::default().load(&source(&file)).await.unwrap();
        let canonical = std::fs::canonicalize(&file).unwrap();
        assert_eq!(docs[0].metadata.source, canonical.display().to_string());
    }

    #[tokio::test]
    async fn file_too_large_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("big.txt");
        std::fs::write(&file, "x").unwrap();

        let loader = TextLoader { max_file_size: 0 };
        let result = loader.load(&source(&file)).await;
        assert!(matches!(result, Err(DocumentError::FileTooLarge(1))));
    }

    #[tokio::test]
    async fn invalid_utf8_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("binary.txt");
        std::fs::write(&file, [0xff, 0xfe, 0x00]).unwrap();

        assert!(TextLoader::default().load(&source(&file)).await.is_err());
    }
}
