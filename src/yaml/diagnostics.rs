//! YAML syntax diagnostics pointing at the offending character

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_json::Value;
use thiserror::Error;

/// YAML syntax error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("YAML syntax error: {message}")]
#[diagnostic(code(proshop::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,

    line: usize,
}

impl YamlSyntaxError {
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));

        let offset = line_col_to_offset(source, line, column);
        let message = err.to_string();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            message,
            line,
        }
    }

    /// 1-based line of the error
    pub fn line(&self) -> usize {
        self.line
    }
}

/// Parse a record file into a document, with a located error on bad syntax
pub fn parse_document(source: &str, filename: &str) -> Result<Value, YamlSyntaxError> {
    serde_yml::from_str(source).map_err(|e| YamlSyntaxError::from_serde_error(&e, source, filename))
}

/// Convert 1-based line/column to a byte offset, clamped to the source
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut line_start = 0;
    for (i, text) in source.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            let within = text
                .char_indices()
                .nth(column.saturating_sub(1))
                .map(|(j, _)| j)
                .unwrap_or(text.len());
            return line_start + within;
        }
        line_start += text.len();
    }
    source.len().saturating_sub(1)
}

fn generate_help(message: &str) -> Option<String> {
    let msg = message.to_lowercase();

    if msg.contains("tab") {
        return Some("YAML indents with spaces, not tabs".to_string());
    }
    if msg.contains("duplicate") {
        return Some("Each key can only appear once in a mapping".to_string());
    }
    if msg.contains("mapping values are not allowed") {
        return Some("Add a space after ':' or check the indentation".to_string());
    }
    if msg.contains("did not find expected") || msg.contains("expected block end") {
        return Some("Check for an unclosed bracket or quote, or uneven indentation".to_string());
    }
    if msg.contains("unexpected ':'") {
        return Some("Quote values that contain colons: \"10:30\"".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_to_offset() {
        let source = "line1\nline2\nline3";
        assert_eq!(line_col_to_offset(source, 1, 1), 0);
        assert_eq!(line_col_to_offset(source, 2, 1), 6);
        assert_eq!(line_col_to_offset(source, 3, 3), 14);
        assert_eq!(line_col_to_offset(source, 9, 1), 16);
    }

    #[test]
    fn test_help_generation() {
        assert!(generate_help("found a tab character").is_some());
        assert!(generate_help("duplicate entry with key \"name\"").is_some());
        assert!(generate_help("some random error").is_none());
    }

    #[test]
    fn test_parse_document() {
        let doc = parse_document("name: Pat\nweight: 15\n", "x.shop.yaml").unwrap();
        assert_eq!(doc["weight"], 15);

        let err = parse_document("name: Pat\nholes: [unclosed\n", "x.shop.yaml").unwrap_err();
        assert!(err.line() >= 2);
    }
}
