//! Record identity system using type-prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Record type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityPrefix {
    /// Customer
    Cust,
    /// Bowling ball
    Ball,
    /// Drill sheet (finger-hole layout)
    Drl,
    /// Work order
    Wo,
    /// Employee
    Emp,
    /// Shop location
    Loc,
}

impl EntityPrefix {
    /// Get the string representation of the prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Cust => "CUST",
            EntityPrefix::Ball => "BALL",
            EntityPrefix::Drl => "DRL",
            EntityPrefix::Wo => "WO",
            EntityPrefix::Emp => "EMP",
            EntityPrefix::Loc => "LOC",
        }
    }

    /// Human-readable singular name, used in messages
    pub fn label(&self) -> &'static str {
        match self {
            EntityPrefix::Cust => "customer",
            EntityPrefix::Ball => "ball",
            EntityPrefix::Drl => "drill sheet",
            EntityPrefix::Wo => "work order",
            EntityPrefix::Emp => "employee",
            EntityPrefix::Loc => "location",
        }
    }

    /// Get all valid prefixes
    pub fn all() -> &'static [EntityPrefix] {
        &[
            EntityPrefix::Cust,
            EntityPrefix::Ball,
            EntityPrefix::Drl,
            EntityPrefix::Wo,
            EntityPrefix::Emp,
            EntityPrefix::Loc,
        ]
    }

    /// Try to determine the prefix from a filename like "DRL-xxx.shop.yaml"
    /// or "drl.schema.json"
    pub fn from_filename(filename: &str) -> Option<Self> {
        let upper = filename.to_uppercase();
        Self::all().iter().copied().find(|prefix| {
            let p = prefix.as_str();
            upper.starts_with(&format!("{}-", p)) || upper.starts_with(&format!("{}.", p))
        })
    }

    /// Try to determine the prefix from a file path by examining parent directories
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        if let Some(filename) = path.file_name() {
            if let Some(prefix) = Self::from_filename(&filename.to_string_lossy()) {
                return Some(prefix);
            }
        }

        for component in path.components() {
            if let std::path::Component::Normal(os_str) = component {
                match os_str.to_string_lossy().to_lowercase().as_str() {
                    "customers" => return Some(EntityPrefix::Cust),
                    "balls" => return Some(EntityPrefix::Ball),
                    "drill_sheets" => return Some(EntityPrefix::Drl),
                    "work_orders" => return Some(EntityPrefix::Wo),
                    "employees" => return Some(EntityPrefix::Emp),
                    "locations" => return Some(EntityPrefix::Loc),
                    _ => {}
                }
            }
        }
        None
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CUST" => Ok(EntityPrefix::Cust),
            "BALL" => Ok(EntityPrefix::Ball),
            "DRL" => Ok(EntityPrefix::Drl),
            "WO" => Ok(EntityPrefix::Wo),
            "EMP" => Ok(EntityPrefix::Emp),
            "LOC" => Ok(EntityPrefix::Loc),
            _ => Err(IdParseError::InvalidPrefix(s.to_string())),
        }
    }
}

/// A unique record identifier combining a type prefix and ULID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Create a new EntityId with the given prefix
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    pub fn prefix(&self) -> EntityPrefix {
        self.prefix
    }

    pub fn ulid(&self) -> Ulid {
        self.ulid
    }

    /// Parse an EntityId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix_str, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        let prefix = prefix_str.parse()?;
        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { prefix, ulid })
    }
}

impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing record IDs
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid record prefix: '{0}' (valid: CUST, BALL, DRL, WO, EMP, LOC)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in record ID: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id = EntityId::new(EntityPrefix::Drl);
        assert!(id.to_string().starts_with("DRL-"));
        assert_eq!(id.to_string().len(), 30); // DRL- (4) + ULID (26)
    }

    #[test]
    fn test_entity_id_parsing() {
        let original = EntityId::new(EntityPrefix::Cust);
        let parsed = EntityId::parse(&original.to_string()).unwrap();
        assert_eq!(parsed.prefix(), EntityPrefix::Cust);
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_entity_id_invalid_prefix() {
        let err = EntityId::parse("REQ-01HQ3K4N5M6P7R8S9T0VWXYZAB").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidPrefix(_)));
    }

    #[test]
    fn test_entity_id_missing_delimiter() {
        let err = EntityId::parse("DRL01HQ3K4N5M6P7R8S9T0VWXYZ").unwrap_err();
        assert!(matches!(err, IdParseError::MissingDelimiter(_)));
    }

    #[test]
    fn test_entity_id_invalid_ulid() {
        let err = EntityId::parse("WO-notaulid").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidUlid(_, _)));
    }

    #[test]
    fn test_all_prefixes_parse() {
        for prefix in EntityPrefix::all() {
            let id = EntityId::new(*prefix);
            let parsed = EntityId::parse(&id.to_string()).unwrap();
            assert_eq!(parsed.prefix(), *prefix);
        }
    }

    #[test]
    fn test_prefix_from_path() {
        let path = std::path::Path::new("/shop/drill_sheets/notes.yaml");
        assert_eq!(EntityPrefix::from_path(path), Some(EntityPrefix::Drl));
        assert_eq!(
            EntityPrefix::from_filename("wo.schema.json"),
            Some(EntityPrefix::Wo)
        );
        assert_eq!(EntityPrefix::from_filename("readme.md"), None);
    }
}
