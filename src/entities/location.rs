//! Location entity type - a bowling center or shop counter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Unique identifier (LOC-xxx)
    pub id: EntityId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default)]
    pub pro_shop_id: String,

    pub created: DateTime<Utc>,

    pub author: String,
}

impl Entity for Location {
    const PREFIX: EntityPrefix = EntityPrefix::Loc;

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

impl Location {
    pub fn new(name: String, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Loc),
            name,
            address: None,
            phone: None,
            pro_shop_id: String::new(),
            created: Utc::now(),
            author,
        }
    }
}
