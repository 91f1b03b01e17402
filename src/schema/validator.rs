//! Schema validation with located error reporting

use std::collections::HashMap;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{validator_for, ValidationError as JsonSchemaError, Validator as JsonValidator};
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::core::identity::EntityPrefix;
use crate::schema::registry::SchemaRegistry;

/// Every schema violation in one record file
#[derive(Debug, Error, Diagnostic)]
#[error("Schema validation failed: {summary}")]
#[diagnostic(code(proshop::schema::validation_error))]
pub struct ValidationError {
    summary: String,

    #[source_code]
    src: NamedSource<String>,

    #[related]
    violations: Vec<SchemaViolation>,
}

/// A single schema violation
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SchemaViolation {
    #[label("{}", self.hint)]
    span: SourceSpan,

    message: String,
    hint: String,

    #[help]
    help: Option<String>,
}

impl SchemaViolation {
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ValidationError {
    pub fn new(filename: &str, source: &str, violations: Vec<SchemaViolation>) -> Self {
        let summary = match violations.len() {
            1 => "1 error".to_string(),
            n => format!("{} errors", n),
        };
        Self {
            summary,
            src: NamedSource::new(filename, source.to_string()),
            violations,
        }
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[SchemaViolation] {
        &self.violations
    }
}

/// Compiled schemas for every record type
pub struct Validator {
    compiled: HashMap<EntityPrefix, JsonValidator>,
}

impl Validator {
    pub fn new(registry: &SchemaRegistry) -> Self {
        let mut compiled = HashMap::new();

        for prefix in EntityPrefix::all() {
            let Some(source) = registry.get(*prefix) else {
                continue;
            };
            let schema = match serde_json::from_str::<JsonValue>(source) {
                Ok(schema) => schema,
                Err(e) => {
                    tracing::warn!(%prefix, error = %e, "schema is not valid JSON");
                    continue;
                }
            };
            match validator_for(&schema) {
                Ok(validator) => {
                    compiled.insert(*prefix, validator);
                }
                Err(e) => tracing::warn!(%prefix, error = %e, "schema failed to compile"),
            }
        }

        Self { compiled }
    }

    pub fn has_schema(&self, prefix: EntityPrefix) -> bool {
        self.compiled.contains_key(&prefix)
    }

    /// Check a parsed document against its record type's schema
    ///
    /// `source` is the file text the document was parsed from; violations
    /// point into it. Record types without a schema always pass.
    pub fn validate(
        &self,
        document: &JsonValue,
        source: &str,
        filename: &str,
        prefix: EntityPrefix,
    ) -> Result<(), ValidationError> {
        let Some(schema) = self.compiled.get(&prefix) else {
            return Ok(());
        };

        let violations: Vec<SchemaViolation> = schema
            .iter_errors(document)
            .map(|e| error_to_violation(source, &e))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(filename, source, violations))
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(&SchemaRegistry::default())
    }
}

fn error_to_violation(source: &str, error: &JsonSchemaError) -> SchemaViolation {
    let path = error.instance_path.to_string();
    SchemaViolation {
        span: find_path_span(source, &path),
        message: format_schema_error(error),
        hint: format_error_hint(error),
        help: generate_help_message(error),
    }
}

fn format_schema_error(error: &JsonSchemaError) -> String {
    let path = if error.instance_path.as_str().is_empty() {
        "document root".to_string()
    } else {
        format!("'{}'", error.instance_path)
    };

    match &error.kind {
        ValidationErrorKind::Required { property } => {
            format!("Missing required field: {} at {}", value_text(property), path)
        }
        ValidationErrorKind::Type { kind } => {
            format!("Wrong type at {}: expected {:?}", path, kind)
        }
        ValidationErrorKind::Enum { options } => {
            format!("Invalid value at {}: must be one of: {}", path, format_enum_options(options))
        }
        ValidationErrorKind::Pattern { pattern } => {
            format!("Value at {} doesn't match pattern: {}", path, pattern)
        }
        ValidationErrorKind::MinLength { .. } => format!("Value at {} must not be empty", path),
        ValidationErrorKind::Minimum { limit } => {
            format!("Value at {} is too small: minimum {}", path, limit)
        }
        ValidationErrorKind::Maximum { limit } => {
            format!("Value at {} is too large: maximum {}", path, limit)
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            format!("Unknown field(s) at {}: {}", path, unexpected.join(", "))
        }
        _ => format!("Validation error at {}: {}", path, error),
    }
}

fn value_text(value: &JsonValue) -> String {
    value
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

fn format_enum_options(options: &JsonValue) -> String {
    match options.as_array() {
        Some(arr) => arr.iter().map(value_text).collect::<Vec<_>>().join(", "),
        None => options.to_string(),
    }
}

/// Short label shown under the offending line
fn format_error_hint(error: &JsonSchemaError) -> String {
    match &error.kind {
        ValidationErrorKind::Required { .. } => "required field missing",
        ValidationErrorKind::Type { .. } => "wrong type",
        ValidationErrorKind::Enum { .. } => "invalid value",
        ValidationErrorKind::Pattern { .. } => "pattern mismatch",
        ValidationErrorKind::MinLength { .. } => "empty",
        ValidationErrorKind::Minimum { .. } | ValidationErrorKind::Maximum { .. } => {
            "out of range"
        }
        ValidationErrorKind::AdditionalProperties { .. } => "unknown field",
        _ => "validation error",
    }
    .to_string()
}

fn generate_help_message(error: &JsonSchemaError) -> Option<String> {
    match &error.kind {
        ValidationErrorKind::Required { property } => {
            Some(format!("Add the '{}' field to your file", value_text(property)))
        }
        ValidationErrorKind::Enum { options } => {
            Some(format!("Valid values: {}", format_enum_options(options)))
        }
        ValidationErrorKind::Pattern { pattern } => pattern
            .strip_prefix('^')
            .and_then(|p| p.split_once('-'))
            .map(|(prefix, _)| {
                format!(
                    "ID format: {}-[26 character ULID], e.g. {}-01HC2JB7SMQX7RS1Y0GFKBHPTD",
                    prefix, prefix
                )
            }),
        ValidationErrorKind::AdditionalProperties { unexpected } => match unexpected.as_slice() {
            [one] => Some(format!("Remove the '{}' field or check spelling", one)),
            _ => Some("Remove unknown fields or check spelling".to_string()),
        },
        _ => None,
    }
}

/// Span of the YAML key addressed by a JSON pointer such as `/holes/thumb/size`
///
/// Keys are searched in order, each one below and deeper than the last, so
/// `size` under `thumb` is not confused with `size` under `middle`. Array
/// indices are skipped. Falls back to the deepest key found, then to the
/// first line.
fn find_path_span(source: &str, json_path: &str) -> SourceSpan {
    let first_line: SourceSpan = (0, source.find('\n').unwrap_or(source.len()).max(1)).into();

    let mut found = None;
    let mut from = 0;
    let mut min_indent = 0;

    for key in json_path.split('/').filter(|s| !s.is_empty()) {
        if key.parse::<usize>().is_ok() {
            continue;
        }
        match find_key_span(source, key, from, min_indent) {
            Some((start, len, indent)) => {
                found = Some((start, len).into());
                from = start + len;
                min_indent = indent + 1;
            }
            None => break,
        }
    }

    found.unwrap_or(first_line)
}

/// First `key:` line at or after byte `from` indented at least `min_indent`
///
/// Returns (start, length, indent); list items (`- key:`) count the dash as
/// indentation.
fn find_key_span(
    source: &str,
    key: &str,
    from: usize,
    min_indent: usize,
) -> Option<(usize, usize, usize)> {
    let pattern = format!("{}:", key);
    let mut offset = 0;

    for line in source.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        if line_start < from {
            continue;
        }

        let body = line.trim_end_matches(['\n', '\r']);
        let trimmed = body.trim_start();
        let item = trimmed.strip_prefix("- ").unwrap_or(trimmed);
        let indent = body.len() - item.len();

        if indent >= min_indent && item.starts_with(&pattern) {
            let start = line_start + indent;
            return Some((start, item.len().max(1), indent));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUSTOMER: &str = r#"id: CUST-01HC2JB7SMQX7RS1Y0GFKBHPTD
name: Pat Rivera
email: pat@example.com
created: 2024-01-01T00:00:00Z
author: Test
"#;

    fn check(yaml: &str, prefix: EntityPrefix) -> Result<(), ValidationError> {
        let document: JsonValue = serde_yml::from_str(yaml).unwrap();
        Validator::default().validate(&document, yaml, "test.shop.yaml", prefix)
    }

    #[test]
    fn test_validator_compiles_every_schema() {
        let validator = Validator::default();
        for prefix in EntityPrefix::all() {
            assert!(validator.has_schema(*prefix), "{} schema", prefix);
        }
    }

    #[test]
    fn test_valid_customer() {
        assert!(check(CUSTOMER, EntityPrefix::Cust).is_ok());
    }

    #[test]
    fn test_missing_required_field() {
        let yaml = CUSTOMER.replace("name: Pat Rivera\n", "");
        let err = check(&yaml, EntityPrefix::Cust).unwrap_err();
        assert_eq!(err.violation_count(), 1);
        assert!(err.violations()[0].message().contains("name"));
    }

    #[test]
    fn test_unknown_field_and_bad_enum() {
        let yaml = r#"id: DRL-01HC2JB7SMQX7RS1Y0GFKBHPTD
name: Sheet
grip_style: sideways
colour: red
holes:
  middle: {}
  ring: {}
created: 2024-01-01T00:00:00Z
author: Test
"#;
        let err = check(yaml, EntityPrefix::Drl).unwrap_err();
        assert_eq!(err.violation_count(), 2);
    }

    #[test]
    fn test_legacy_drill_sheet_passes_schema() {
        let yaml = r#"id: DRL-01HC2JB7SMQX7RS1Y0GFKBHPTD
name: Old sheet
spans:
  thumb_to_middle:
    fit_span: 4.4
  middle_to_ring:
    fit_span: 0.3
holes:
  thumb_enabled: true
  middle:
    size:
      primary: 31/64
  ring:
    size:
      primary: 31/64
created: 2024-01-01T00:00:00Z
author: Test
"#;
        assert!(check(yaml, EntityPrefix::Drl).is_ok());
    }

    #[test]
    fn test_satisfaction_range() {
        let yaml = r#"id: WO-01HC2JB7SMQX7RS1Y0GFKBHPTD
description: Drill
customer_id: CUST-01HC2JB7SMQX7RS1Y0GFKBHPTD
satisfaction: 9
created: 2024-01-01T00:00:00Z
author: Test
"#;
        assert!(check(yaml, EntityPrefix::Wo).is_err());
    }

    #[test]
    fn test_find_path_span_follows_nesting() {
        let yaml = "holes:\n  thumb:\n    size: a\n  middle:\n    size: b\n";
        let span = find_path_span(yaml, "/holes/middle/size");
        assert_eq!(&yaml[span.offset()..span.offset() + span.len()], "size: b");
    }

    #[test]
    fn test_find_path_span_falls_back_to_first_line() {
        let span = find_path_span(CUSTOMER, "/nowhere");
        assert_eq!(span.offset(), 0);
    }
}
