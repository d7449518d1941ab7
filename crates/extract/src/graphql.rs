use crate::{ExtractedQuery, Extractor};
use std::path::Path;

/// `.graphql` and `.gql` files: the whole file is one document.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphqlExtractor;

impl Extractor for GraphqlExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &[".graphql", ".gql"]
    }

    fn extract(&self, path: &Path, content: &str) -> Vec<ExtractedQuery> {
        if content.trim().is_empty() {
            return Vec::new();
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        vec![ExtractedQuery::new(content, path, 1).with_identifier(stem)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_file_is_one_query() {
        let content = "\nquery Shop {\n  shop { name }\n}\n";
        let queries = GraphqlExtractor.extract(Path::new("queries/shop_info.graphql"), content);
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].content, content);
        assert_eq!(queries[0].start_line, 1);
        assert_eq!(queries[0].identifier, "shop_info");
    }

    #[test]
    fn test_blank_file_is_skipped() {
        assert!(GraphqlExtractor
            .extract(Path::new("empty.gql"), "  \n\t\n")
            .is_empty());
    }
}
