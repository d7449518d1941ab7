use crate::ExtractedQuery;
use std::path::Path;

/// Pulls query documents out of one kind of source file.
pub trait Extractor: Send + Sync {
    /// Lowercase extensions handled, with the leading dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Every query document in `content`, in file order.
    fn extract(&self, path: &Path, content: &str) -> Vec<ExtractedQuery>;
}
