//! Embedded JSON Schemas, one per record type

use std::collections::HashMap;

use rust_embed::Embed;

use crate::core::identity::EntityPrefix;

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// Schema sources keyed by record prefix
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<EntityPrefix, String>,
}

impl SchemaRegistry {
    /// File name of a record type's schema, e.g. `drl.schema.json`
    pub fn file_name(prefix: EntityPrefix) -> String {
        format!("{}.schema.json", prefix.as_str().to_lowercase())
    }

    /// Raw schema source for a record type
    pub fn get(&self, prefix: EntityPrefix) -> Option<&str> {
        self.schemas.get(&prefix).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        let mut schemas = HashMap::new();
        for prefix in EntityPrefix::all() {
            let Some(file) = EmbeddedSchemas::get(&Self::file_name(*prefix)) else {
                continue;
            };
            match String::from_utf8(file.data.into_owned()) {
                Ok(source) => {
                    schemas.insert(*prefix, source);
                }
                Err(e) => tracing::warn!(%prefix, error = %e, "embedded schema is not UTF-8"),
            }
        }
        Self { schemas }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_record_type_has_a_schema() {
        let registry = SchemaRegistry::default();
        for prefix in EntityPrefix::all() {
            let source = registry.get(*prefix).unwrap();
            let json: serde_json::Value = serde_json::from_str(source).unwrap();
            assert_eq!(json["type"], "object", "{} schema", prefix);
        }
        assert_eq!(registry.len(), EntityPrefix::all().len());
    }
}
