//! Customer entity type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// A pro-shop customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier (CUST-xxx)
    pub id: EntityId,

    /// Full name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Free-form notes (league nights, preferences, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Owning pro shop
    #[serde(default)]
    pub pro_shop_id: String,

    pub created: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    pub author: String,
}

impl Entity for Customer {
    const PREFIX: EntityPrefix = EntityPrefix::Cust;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }

    fn pro_shop_id(&self) -> &str {
        &self.pro_shop_id
    }
}

impl Customer {
    pub fn new(name: String, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Cust),
            name,
            email: None,
            phone: None,
            address: None,
            notes: None,
            pro_shop_id: String::new(),
            created: Utc::now(),
            updated: None,
            author,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_roundtrip() {
        let mut customer = Customer::new("Pat Rivera".to_string(), "test".to_string());
        customer.email = Some("pat@example.com".to_string());

        let yaml = serde_yml::to_string(&customer).unwrap();
        assert!(!yaml.contains("phone"));

        let parsed: Customer = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed, customer);
    }
}
