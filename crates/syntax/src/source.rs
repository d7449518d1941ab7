use crate::LineIndex;
use query_analyzer_types::{LineColumn, Origin};
use std::sync::Arc;

/// The text of one query document and where it sits in its host file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySource {
    pub text: String,
    /// Host file path
    pub file: Arc<str>,
    /// Host line of the first character of `text` (1-based)
    pub start_line: u32,
    /// Host column of the first character of `text` (1-based)
    pub start_column: u32,
    /// Name for reports: a variable or constant name, a heredoc label, a file stem
    pub identifier: Option<String>,
}

impl QuerySource {
    /// A query that starts at the beginning of its file.
    #[must_use]
    pub fn new(text: impl Into<String>, file: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            file: file.into(),
            start_line: 1,
            start_column: 1,
            identifier: None,
        }
    }

    /// Set the host position of the first character.
    #[must_use]
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.start_line = line.max(1);
        self.start_column = column.max(1);
        self
    }

    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Host origin of the first character.
    #[must_use]
    pub fn origin(&self) -> Origin {
        Origin::new(Arc::clone(&self.file), self.start_line, self.start_column)
    }

    /// Host origin of a position relative to the query text.
    #[must_use]
    pub fn translate(&self, relative: LineColumn) -> Origin {
        self.origin().translate(relative)
    }

    /// Host origin of a byte offset into the query text.
    #[must_use]
    pub fn origin_at(&self, index: &LineIndex<'_>, offset: usize) -> Origin {
        self.translate(index.line_column(offset))
    }

    /// Name for reports, falling back to `file:line`.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.identifier
            .clone()
            .unwrap_or_else(|| format!("{}:{}", self.file, self.start_line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_at_maps_into_host() {
        let source = QuerySource::new("query {\n  shop\n}", "app/Shop.php").at(40, 9);
        let index = LineIndex::new(&source.text);

        assert_eq!(source.origin_at(&index, 0), Origin::new("app/Shop.php", 40, 9));
        assert_eq!(source.origin_at(&index, 10), Origin::new("app/Shop.php", 41, 3));
    }

    #[test]
    fn test_display_name() {
        let anonymous = QuerySource::new("{ a }", "q.graphql").at(3, 1);
        assert_eq!(anonymous.display_name(), "q.graphql:3");
        assert_eq!(
            anonymous.with_identifier("ORDERS_QUERY").display_name(),
            "ORDERS_QUERY"
        );
    }
}
