//! YAML parsing helpers

pub mod diagnostics;

pub use diagnostics::{parse_document, YamlSyntaxError};
