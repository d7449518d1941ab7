use query_analyzer_syntax::QuerySource;
use std::path::{Path, PathBuf};

/// A GraphQL document found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedQuery {
    /// Query text, ready to parse
    pub content: String,
    pub file: PathBuf,
    /// Host line of the first line of `content` (1-based)
    pub start_line: u32,
    /// Host column of the first character of `content` (1-based)
    pub start_column: u32,
    /// Assigned variable or constant, heredoc label, or file stem
    pub identifier: String,
}

impl ExtractedQuery {
    #[must_use]
    pub fn new(content: impl Into<String>, file: &Path, start_line: u32) -> Self {
        Self {
            content: content.into(),
            file: file.to_path_buf(),
            start_line,
            start_column: 1,
            identifier: String::new(),
        }
    }

    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Host line of the last line of `content`.
    #[must_use]
    pub fn end_line(&self) -> u32 {
        let newlines = self.content.matches('\n').count() as u32;
        self.start_line + newlines
    }

    /// Hand the query over to the parser.
    #[must_use]
    pub fn into_source(self) -> QuerySource {
        let file = self.file.display().to_string();
        let source = QuerySource::new(self.content, file).at(self.start_line, self.start_column);
        if self.identifier.is_empty() {
            source
        } else {
            source.with_identifier(self.identifier)
        }
    }
}
