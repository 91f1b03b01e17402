//! Employee entity type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::team::Role;

/// A pro-shop employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier (EMP-xxx)
    pub id: EntityId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    pub role: Role,

    /// Hourly rate used to derive work-order labor cost
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,

    /// Home location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<EntityId>,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default)]
    pub pro_shop_id: String,

    pub created: DateTime<Utc>,

    pub author: String,
}

fn default_active() -> bool {
    true
}

impl Entity for Employee {
    const PREFIX: EntityPrefix = EntityPrefix::Emp;

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

impl Employee {
    pub fn new(name: String, role: Role, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Emp),
            name,
            email: None,
            phone: None,
            role,
            hourly_rate: None,
            location_id: None,
            active: true,
            pro_shop_id: String::new(),
            created: Utc::now(),
            author,
        }
    }
}
