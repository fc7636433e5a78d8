use std::pin::Pin;

use serde_json::Value;

use super::super::{
    DEFAULT_MAX_FILE_SIZE, Document, DocumentError, DocumentFormat, DocumentLoader,
    DocumentMetadata, SourceFile,
};

/// Loads a JSON file as one document made of its string leaves, in document order.
pub struct JsonLoader {
    pub max_file_size: u64,
}

impl Default for JsonLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for JsonLoader {
    fn load<'a>(
        &'a self,
        file: &'a SourceFile,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<Document>, DocumentError>> + Send + 'a>>
    {
        Box::pin(async move {
            let (path, raw) = super::read_checked(&file.path, self.max_file_size).await?;
            let value: Value = serde_json::from_str(&raw)?;

            let mut leaves = Vec::new();
            collect_strings(&value, &mut leaves);

            Ok(vec![Document {
                content: leaves.join("\n"),
                metadata: DocumentMetadata::new(path.display().to_string(), DocumentFormat::Json),
            }])
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }
}

fn collect_strings<'v>(value: &'v Value, out: &mut Vec<&'v str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}
