use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::loader::{CsvLoader, JsonLoader, NotionLoader, TextLoader};
use super::{DocumentError, DocumentLoader};

/// What to do with files whose extension has no registered loader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownHandling {
    #[default]
    Ignore,
    Warn,
    Error,
}

impl std::str::FromStr for UnknownHandling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown handling mode: {other}")),
        }
    }
}

/// Maps lowercase file extensions to loaders.
#[derive(Clone)]
pub struct LoaderRegistry {
    loaders: HashMap<String, Arc<dyn DocumentLoader>>,
    unknown: UnknownHandling,
}

impl std::fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut exts: Vec<_> = self.loaders.keys().collect();
        exts.sort();
        f.debug_struct("LoaderRegistry")
            .field("extensions", &exts)
            .field("unknown", &self.unknown)
            .finish()
    }
}

impl LoaderRegistry {
    #[must_use]
    pub fn empty(unknown: UnknownHandling) -> Self {
        Self {
            loaders: HashMap::new(),
            unknown,
        }
    }

    /// Registry with every built-in loader, each limited to `max_file_size` bytes.
    #[must_use]
    pub fn with_defaults(max_file_size: u64, unknown: UnknownHandling) -> Self {
        let mut registry = Self::empty(unknown);
        registry.register(Arc::new(TextLoader { max_file_size }));
        registry.register(Arc::new(JsonLoader { max_file_size }));
        registry.register(Arc::new(CsvLoader {
            max_file_size,
            ..CsvLoader::default()
        }));
        registry.register(Arc::new(NotionLoader { max_file_size }));
        #[cfg(feature = "pdf")]
        registry.register(Arc::new(super::loader::PdfLoader { max_file_size }));
        registry
    }

    /// Register `loader` for all of its extensions, replacing earlier registrations.
    pub fn register(&mut self, loader: Arc<dyn DocumentLoader>) {
        for ext in loader.supported_extensions() {
            self.loaders
                .insert(ext.to_ascii_lowercase(), Arc::clone(&loader));
        }
    }

    #[must_use]
    pub fn loader_for(&self, extension: &str) -> Option<&Arc<dyn DocumentLoader>> {
        self.loaders.get(&extension.to_ascii_lowercase())
    }

    #[must_use]
    pub fn unknown_handling(&self) -> UnknownHandling {
        self.unknown
    }

    /// Resolve a loader, applying the unknown-extension policy when none is registered.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::UnsupportedFormat` under [`UnknownHandling::Error`].
    pub fn resolve(
        &self,
        extension: &str,
        path: &std::path::Path,
    ) -> Result<Option<&Arc<dyn DocumentLoader>>, DocumentError> {
        if let Some(loader) = self.loader_for(extension) {
            return Ok(Some(loader));
        }
        match self.unknown {
            UnknownHandling::Ignore => Ok(None),
            UnknownHandling::Warn => {
                tracing::warn!(path = %path.display(), "skipping file with unsupported extension");
                Ok(None)
            }
            UnknownHandling::Error => Err(DocumentError::UnsupportedFormat(format!(
                "{} (extension {extension:?})",
                path.display()
            ))),
        }
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::with_defaults(super::DEFAULT_MAX_FILE_SIZE, UnknownHandling::default())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn defaults_cover_builtin_formats() {
        let registry = LoaderRegistry::default();
        for ext in ["txt", "json", "csv", "md", "markdown"] {
            assert!(registry.loader_for(ext).is_some(), "missing loader for {ext}");
        }
        assert!(registry.loader_for("exe").is_none());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(LoaderRegistry::default().loader_for("TXT").is_some());
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_registered_when_enabled() {
        assert!(LoaderRegistry::default().loader_for("pdf").is_some());
    }

    #[test]
    fn unknown_ignored_by_default() {
        let registry = LoaderRegistry::default();
        assert!(registry.resolve("bin", Path::new("a.bin")).unwrap().is_none());
    }

    #[test]
    fn unknown_error_policy() {
        let registry = LoaderRegistry::with_defaults(1024, UnknownHandling::Error);
        let Err(err) = registry.resolve("bin", Path::new("a.bin")) else {
            panic!("unknown extension should be rejected");
        };
        assert!(matches!(err, DocumentError::UnsupportedFormat(_)));
    }

    #[test]
    fn unknown_handling_parses() {
        assert_eq!("WARN".parse::<UnknownHandling>().unwrap(), UnknownHandling::Warn);
        assert!("loud".parse::<UnknownHandling>().is_err());
    }

    #[test]
    fn register_overrides_extension() {
        let mut registry = LoaderRegistry::empty(UnknownHandling::Ignore);
        assert!(registry.loader_for("md").is_none());
        registry.register(Arc::new(TextLoader::default()));
        registry.register(Arc::new(NotionLoader::default()));
        assert_eq!(
            registry.loader_for("md").unwrap().supported_extensions(),
            &["md", "markdown"]
        );
    }
}
