//! Source locations in host files.

use std::sync::Arc;

/// Position inside a piece of text (1-indexed line and column).
///
/// Columns count Unicode scalar values from the start of the line, which is
/// what editors show in their status bar and what `file:line:col` links expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineColumn {
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (1-indexed)
    pub column: u32,
}

impl LineColumn {
    /// Create a new position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Default for LineColumn {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl std::fmt::Display for LineColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Location of a node in the original host file.
///
/// Queries are frequently embedded in other files (a PHP heredoc, a
/// `.graphql` file, ...). An `Origin` always refers to the host file, so a
/// query that starts on line 40 reports a selection on its third line at
/// line 42.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Origin {
    /// Path of the host file, as given to the analyzer
    pub file: Arc<str>,
    /// Line number in the host file (1-indexed)
    pub line: u32,
    /// Column number in the host file (1-indexed)
    pub column: u32,
}

impl Origin {
    /// Create a new origin.
    #[must_use]
    pub fn new(file: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Origin of the first character of a file.
    #[must_use]
    pub fn start_of(file: impl Into<Arc<str>>) -> Self {
        Self::new(file, 1, 1)
    }

    /// Translate a position relative to an embedded query into host coordinates.
    ///
    /// `self` is where the query text starts in the host file. Only the first
    /// line of the query is shifted horizontally; every following line starts
    /// at the host's own column 1.
    #[must_use]
    pub fn translate(&self, relative: LineColumn) -> Self {
        let line = self.line + relative.line.saturating_sub(1);
        let column = if relative.line <= 1 {
            self.column + relative.column.saturating_sub(1)
        } else {
            relative.column
        };
        Self {
            file: Arc::clone(&self.file),
            line,
            column,
        }
    }

    /// Line and column of this origin, without the file.
    #[must_use]
    pub const fn position(&self) -> LineColumn {
        LineColumn::new(self.line, self.column)
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
