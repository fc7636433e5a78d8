use std::path::{Component, Path};
use std::pin::Pin;

use super::super::{
    DEFAULT_MAX_FILE_SIZE, Document, DocumentError, DocumentFormat, DocumentLoader,
    DocumentMetadata, SourceFile,
};

const NOTION_ID_LEN: usize = 32;

/// Loads pages of a Notion markdown export, one document per page.
///
/// Notion appends a 32-character hex id to every exported page and directory name. The id is
/// stripped from the `title` and `path` metadata so the page hierarchy stays readable.
pub struct NotionLoader {
    pub max_file_size: u64,
}

impl Default for NotionLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for NotionLoader {
    fn load<'a>(
        &'a self,
        file: &'a SourceFile,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<Document>, DocumentError>> + Send + 'a>>
    {
        Box::pin(async move {
            let (path, content) = super::read_checked(&file.path, self.max_file_size).await?;
            let (title, hierarchy) = page_hierarchy(&file.relative);

            Ok(vec![Document {
                content,
                metadata: DocumentMetadata::new(path.display().to_string(), DocumentFormat::Notion)
                    .with_extra("title", title)
                    .with_extra("path", hierarchy),
            }])
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }
}

/// Returns the page title and the ` / `-joined hierarchy for a path relative to the export root.
fn page_hierarchy(relative: &Path) -> (String, String) {
    let title = relative
        .file_stem()
        .map(|s| strip_notion_id(&s.to_string_lossy()))
        .unwrap_or_default();

    let mut parts: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .filter_map(|c| match c {
            Component::Normal(name) => Some(strip_notion_id(&name.to_string_lossy())),
            _ => None,
        })
        .filter(|p| !p.is_empty())
        .collect();
    parts.push(title.clone());

    (title, parts.join(" / "))
}

fn strip_notion_id(name: &str) -> String {
    let trimmed = name.trim();
    if let Some((head, id)) = trimmed.rsplit_once(' ')
        && id.len() == NOTION_ID_LEN
        && id.chars().all(|c| c.is_ascii_hexdigit())
    {
        return head.trim_end().to_owned();
    }
    trimmed.to_owned()
}
