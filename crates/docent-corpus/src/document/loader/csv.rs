use std::fmt::Write as _;
use std::pin::Pin;

use super::super::{
    DEFAULT_MAX_FILE_SIZE, Document, DocumentError, DocumentFormat, DocumentLoader,
    DocumentMetadata, SourceFile,
};

/// Loads a CSV file as one document per data row, rendered as `header: value` lines.
pub struct CsvLoader {
    pub max_file_size: u64,
    pub delimiter: u8,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            delimiter: b',',
        }
    }
}

impl DocumentLoader for CsvLoader {
    fn load<'a>(
        &'a self,
        file: &'a SourceFile,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<Document>, DocumentError>> + Send + 'a>>
    {
        Box::pin(async move {
            let (path, raw) = super::read_checked(&file.path, self.max_file_size).await?;
            let source = path.display().to_string();
            parse_rows(&raw, self.delimiter, &source)
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["csv"]
    }
}

fn parse_rows(raw: &str, delimiter: u8, source: &str) -> Result<Vec<Document>, DocumentError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());
    let headers = reader.headers()?.clone();

    let mut docs = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let mut content = String::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            let _ = writeln!(content, "{header}: {value}");
        }
        docs.push(Document {
            content: content.trim_end().to_owned(),
            metadata: DocumentMetadata::new(source, DocumentFormat::Csv)
                .with_extra("row", row.to_string()),
        });
    }
    Ok(docs)
}
