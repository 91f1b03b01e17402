//! Entity trait - common interface for all shop records

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};

/// Common trait for all pro-shop records
pub trait Entity: Serialize + DeserializeOwned {
    /// The record type prefix (e.g., DRL, CUST)
    const PREFIX: EntityPrefix;

    /// Get the record's unique ID
    fn id(&self) -> &EntityId;

    /// Short display title (customer name, ball model, sheet name, ...)
    fn title(&self) -> &str;

    /// Get the creation timestamp
    fn created(&self) -> DateTime<Utc>;

    /// Who created the record
    fn author(&self) -> &str;

    /// ID of the pro shop that owns this record
    fn pro_shop_id(&self) -> &str;

    /// Owning customer, for records that belong to one
    fn customer_id(&self) -> Option<&EntityId> {
        None
    }

    /// Decode a stored document into this record type.
    ///
    /// Stores decode through this hook rather than calling serde directly so
    /// that record types with older on-disk layouts can upgrade them on load.
    fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
