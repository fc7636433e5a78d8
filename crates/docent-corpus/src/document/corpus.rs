use std::path::{Path, PathBuf};

use super::{Document, DocumentError, LoaderRegistry, SourceFile};

#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: DocumentError,
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub documents: Vec<Document>,
    pub failures: Vec<LoadFailure>,
    /// Files skipped because no loader handles their extension.
    pub ignored: Vec<PathBuf>,
}

/// Walks a corpus directory and decodes every file through a [`LoaderRegistry`].
#[derive(Debug, Clone, Default)]
pub struct CorpusLoader {
    registry: LoaderRegistry,
}

impl CorpusLoader {
    #[must_use]
    pub fn new(registry: LoaderRegistry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &LoaderRegistry {
        &self.registry
    }

    /// Load every supported file under `root`, recursively.
    ///
    /// Failures of individual files are recorded in the report and do not abort the load.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::DirectoryUnreadable` if `root` cannot be listed, or
    /// `DocumentError::UnsupportedFormat` when the registry rejects unknown extensions.
    pub async fn load(&self, root: &Path) -> Result<LoadReport, DocumentError> {
        // listing, not just stat, so unreadable directories fail here
        let _listing = tokio::fs::read_dir(root)
            .await
            .map_err(|source| DocumentError::DirectoryUnreadable {
                path: root.to_path_buf(),
                source,
            })?;

        let files = collect_files(root);
        tracing::info!(root = %root.display(), files = files.len(), "loading corpus");

        let mut report = LoadReport::default();
        for file in files {
            let Some(loader) = self.registry.resolve(&file.extension(), &file.path)? else {
                report.ignored.push(file.path);
                continue;
            };

            match loader.load(&file).await {
                Ok(docs) => {
                    tracing::debug!(path = %file.relative.display(), documents = docs.len(), "loaded file");
                    report.documents.extend(docs);
                }
                Err(error) => {
                    tracing::warn!(path = %file.path.display(), "skipping file: {error}");
                    report.failures.push(LoadFailure {
                        path: file.path,
                        error,
                    });
                }
            }
        }

        tracing::info!(
            documents = report.documents.len(),
            failures = report.failures.len(),
            ignored = report.ignored.len(),
            "corpus loaded"
        );
        Ok(report)
    }
}

fn collect_files(root: &Path) -> Vec<SourceFile> {
    ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                tracing::warn!("corpus walk error: {e}");
                None
            }
        })
        .filter(|e| e.file_type().is_some_and(|ft| ft.is_file()))
        .map(|e| {
            let relative = e.path().strip_prefix(root).unwrap_or(e.path()).to_path_buf();
            SourceFile::new(e.path(), relative)
        })
        .collect()
}
