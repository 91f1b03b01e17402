//! Schema system - embedded JSON Schemas and validation

pub mod registry;
pub mod validator;

pub use registry::SchemaRegistry;
pub use validator::{SchemaViolation, ValidationError, Validator};
