use crate::{ExtractError, ExtractedQuery, Extractor, GraphqlExtractor, PhpExtractor, Result};
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Collects queries from files and directories.
///
/// Files are dispatched on their extension. Directories are walked
/// recursively in file name order so results are deterministic.
pub struct QueryCollector {
    extractors: Vec<Box<dyn Extractor>>,
}

impl Default for QueryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCollector {
    /// A collector for `.graphql`, `.gql` and `.php` files.
    #[must_use]
    pub fn new() -> Self {
        Self {
            extractors: vec![Box::new(GraphqlExtractor), Box::new(PhpExtractor)],
        }
    }

    /// Add an extractor. It takes precedence over earlier ones for the
    /// extensions it handles.
    pub fn register(&mut self, extractor: impl Extractor + 'static) {
        self.extractors.push(Box::new(extractor));
    }

    #[must_use]
    pub fn extractor_for(&self, path: &Path) -> Option<&dyn Extractor> {
        let ext = extension(path)?;
        self.extractors
            .iter()
            .rev()
            .find(|e| e.extensions().contains(&ext.as_str()))
            .map(|e| &**e)
    }

    #[must_use]
    pub fn supported_extensions(&self) -> Vec<&'static str> {
        let mut exts: Vec<_> = self
            .extractors
            .iter()
            .flat_map(|e| e.extensions().iter().copied())
            .collect();
        exts.sort_unstable();
        exts.dedup();
        exts
    }

    /// Extract every query below `paths`.
    ///
    /// `extensions` narrows the files considered (`php`, `.graphql`, ...).
    /// Unreadable and non-UTF-8 files are skipped with a warning; a path
    /// that does not exist is an error.
    #[tracing::instrument(skip_all, fields(paths = paths.len()))]
    pub fn collect<P: AsRef<Path>>(
        &self,
        paths: &[P],
        extensions: Option<&[String]>,
    ) -> Result<Vec<ExtractedQuery>> {
        let filter = extensions.map(normalize_extensions);
        let mut queries = Vec::new();

        for path in paths {
            let path = path.as_ref();
            if path.is_file() {
                self.process_file(path, filter.as_deref(), &mut queries);
            } else if path.is_dir() {
                self.process_directory(path, filter.as_deref(), &mut queries);
            } else {
                return Err(ExtractError::PathNotFound(path.to_path_buf()));
            }
        }

        tracing::debug!(queries = queries.len(), "Queries collected");
        Ok(queries)
    }

    /// Extract from in-memory content. Unknown extensions are read as GraphQL.
    #[must_use]
    pub fn collect_from_content(&self, path: &Path, content: &str) -> Vec<ExtractedQuery> {
        self.extractor_for(path)
            .unwrap_or(&GraphqlExtractor)
            .extract(path, content)
    }

    fn process_directory(
        &self,
        dir: &Path,
        filter: Option<&[String]>,
        queries: &mut Vec<ExtractedQuery>,
    ) {
        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != "node_modules");

        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    self.process_file(entry.path(), filter, queries);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable directory entry"),
            }
        }
    }

    fn process_file(
        &self,
        path: &Path,
        filter: Option<&[String]>,
        queries: &mut Vec<ExtractedQuery>,
    ) {
        if let Some(filter) = filter {
            let included = extension(path).is_some_and(|ext| filter.contains(&ext));
            if !included {
                return;
            }
        }
        let Some(extractor) = self.extractor_for(path) else {
            return;
        };

        match std::fs::read_to_string(path) {
            Ok(content) => {
                let found = extractor.extract(path, &content);
                tracing::trace!(file = %path.display(), queries = found.len(), "File extracted");
                queries.extend(found);
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                tracing::debug!(file = %path.display(), "Skipping non UTF-8 file");
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Could not read file");
            }
        }
    }
}

/// Lowercase extension with a leading dot.
fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_ascii_lowercase()))
}

fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| {
            let ext = ext.trim().to_ascii_lowercase();
            if ext.starts_with('.') {
                ext
            } else {
                format!(".{ext}")
            }
        })
        .collect()
}
