use crate::{ExtractedQuery, Extractor};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// `<<<QUERY`, `<<<"GQL"`, `<<<'GRAPHQL'` up to the end of the line.
static OPENER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<<<[ \t]*['"]?(QUERY|GRAPHQL|GQL)['"]?[ \t]*\r?\n"#).expect("must be valid")
});

/// Closing line for each delimiter, indented closers included.
static CLOSERS: LazyLock<[(&str, Regex); 3]> = LazyLock::new(|| {
    ["QUERY", "GRAPHQL", "GQL"].map(|delimiter| {
        let pattern = format!(r"(?i)\n[ \t]*{delimiter};");
        (delimiter, Regex::new(&pattern).expect("must be valid"))
    })
});

static VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\w+)\s*=\s*<<<").expect("must be valid"));

static CONSTANT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)const\s+(\w+)\s*=\s*<<<").expect("must be valid"));

/// PHP heredoc and nowdoc blocks delimited by `QUERY`, `GRAPHQL` or `GQL`.
///
/// Block bodies are dedented, `\$` is unescaped and surrounding blank lines
/// are dropped. Because of the dedent every query starts at column 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhpExtractor;

impl Extractor for PhpExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &[".php"]
    }

    fn extract(&self, path: &Path, content: &str) -> Vec<ExtractedQuery> {
        let mut queries = Vec::new();
        let mut pos = 0;

        while let Some(caps) = OPENER.captures_at(content, pos) {
            let (Some(opener), Some(delimiter)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            let delimiter = delimiter.as_str().to_ascii_uppercase();
            let Some(close) = closer(&delimiter).and_then(|re| re.find_at(content, opener.end()))
            else {
                pos = opener.end();
                continue;
            };
            pos = close.end();

            let (text, leading_lines) = clean_body(&content[opener.end()..close.start()]);
            if text.is_empty() {
                continue;
            }

            let opener_line = line_number(content, opener.start());
            let identifier = assigned_name(content, opener.start()).unwrap_or(delimiter);
            tracing::trace!(line = opener_line, %identifier, "Heredoc query found");

            queries.push(
                ExtractedQuery::new(text, path, opener_line + 1 + leading_lines)
                    .with_identifier(identifier),
            );
        }

        queries
    }
}

fn closer(delimiter: &str) -> Option<&'static Regex> {
    CLOSERS
        .iter()
        .find(|(name, _)| *name == delimiter)
        .map(|(_, re)| re)
}

/// 1-based line of a byte offset.
fn line_number(content: &str, offset: usize) -> u32 {
    content[..offset].matches('\n').count() as u32 + 1
}

/// The variable or constant a heredoc opened at `offset` is assigned to.
fn assigned_name(content: &str, offset: usize) -> Option<String> {
    let line_start = content[..offset].rfind('\n').map_or(0, |i| i + 1);
    let head = &content[line_start..offset + "<<<".len()];
    [&*VARIABLE, &*CONSTANT]
        .into_iter()
        .find_map(|re| re.captures_iter(head).last())
        .map(|caps| caps[1].to_string())
}

/// Dedent, unescape and trim a block body.
///
/// Returns the text and the number of leading lines that were dropped.
fn clean_body(body: &str) -> (String, u32) {
    let text = dedent(body).replace("\\$", "$");
    let trimmed = text.trim_start();
    let leading_lines = text[..text.len() - trimmed.len()].matches('\n').count() as u32;
    (trimmed.trim_end().to_string(), leading_lines)
}

fn is_blank(line: &str) -> bool {
    line.trim_matches([' ', '\t', '\r']).is_empty()
}

fn indent(line: &str) -> &str {
    let rest = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - rest.len()]
}

/// Remove the whitespace prefix shared by every non-blank line.
fn dedent(text: &str) -> String {
    let margin = text
        .split('\n')
        .filter(|line| !is_blank(line))
        .map(indent)
        .reduce(|margin, indent| {
            let common = margin
                .bytes()
                .zip(indent.bytes())
                .take_while(|(a, b)| a == b)
                .count();
            &margin[..common]
        })
        .unwrap_or("");

    text.split('\n')
        .map(|line| if is_blank(line) { "" } else { &line[margin.len()..] })
        .collect::<Vec<_>>()
        .join("\n")
}
