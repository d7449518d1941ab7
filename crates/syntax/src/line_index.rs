use query_analyzer_types::LineColumn;

/// Line index for a piece of text.
/// Maps byte offsets to line/column positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex<'a> {
    text: &'a str,
    /// Byte offset of the start of each line
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    /// Create a new line index from source text
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];

        for (i, c) in text.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }

        Self { text, line_starts }
    }

    /// Convert a byte offset to a 1-based line and column.
    ///
    /// Columns count characters, not bytes. Offsets past the end clamp to the
    /// end of the text.
    #[must_use]
    pub fn line_column(&self, offset: usize) -> LineColumn {
        let offset = offset.min(self.text.len());
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i.saturating_sub(1));

        let line_start = self.line_starts[line];
        let column = self
            .text
            .get(line_start..offset)
            .map_or(offset - line_start, |prefix| prefix.chars().count());

        LineColumn::new(line as u32 + 1, column as u32 + 1)
    }

    /// Get the number of lines
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
