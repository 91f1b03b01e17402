//! Bowling ball entity type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// Where a ball currently is
///
/// Plain label: any status may be changed to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallStatus {
    /// Shop inventory, not yet sold
    InStock,
    /// With the customer, in use
    Active,
    /// Left at the shop for work
    InShop,
    Retired,
    Sold,
}

impl Default for BallStatus {
    fn default() -> Self {
        BallStatus::Active
    }
}

impl BallStatus {
    pub fn all() -> &'static [BallStatus] {
        &[
            BallStatus::InStock,
            BallStatus::Active,
            BallStatus::InShop,
            BallStatus::Retired,
            BallStatus::Sold,
        ]
    }
}

impl std::fmt::Display for BallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BallStatus::InStock => write!(f, "in_stock"),
            BallStatus::Active => write!(f, "active"),
            BallStatus::InShop => write!(f, "in_shop"),
            BallStatus::Retired => write!(f, "retired"),
            BallStatus::Sold => write!(f, "sold"),
        }
    }
}

impl std::str::FromStr for BallStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "in_stock" | "stock" => Ok(BallStatus::InStock),
            "active" => Ok(BallStatus::Active),
            "in_shop" | "shop" => Ok(BallStatus::InShop),
            "retired" => Ok(BallStatus::Retired),
            "sold" => Ok(BallStatus::Sold),
            _ => Err(format!(
                "Invalid ball status: {}. Use in_stock, active, in_shop, retired, or sold",
                s
            )),
        }
    }
}

/// A bowling ball, owned by a customer or held as shop stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BowlingBall {
    /// Unique identifier (BALL-xxx)
    pub id: EntityId,

    /// Owner; absent for shop stock
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<EntityId>,

    pub brand: String,

    pub model: String,

    /// Weight in whole pounds
    pub weight: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,

    /// Layout used to drill this ball
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drill_sheet_id: Option<EntityId>,

    #[serde(default)]
    pub status: BallStatus,

    #[serde(default)]
    pub pro_shop_id: String,

    pub created: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    pub author: String,
}

impl Entity for BowlingBall {
    const PREFIX: EntityPrefix = EntityPrefix::Ball;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.model
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

    fn customer_id(&self) -> Option<&EntityId> {
        self.customer_id.as_ref()
    }
}

impl BowlingBall {
    pub fn new(brand: String, model: String, weight: u8, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Ball),
            customer_id: None,
            brand,
            model,
            weight,
            serial_number: None,
            purchase_price: None,
            purchase_date: None,
            drill_sheet_id: None,
            status: BallStatus::default(),
            pro_shop_id: String::new(),
            created: Utc::now(),
            updated: None,
            author,
        }
    }

    /// Set the status; every transition is allowed
    pub fn set_status(&mut self, status: BallStatus) {
        self.status = status;
        self.updated = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_status_transition_is_allowed() {
        let mut ball = BowlingBall::new(
            "Storm".to_string(),
            "Phaze II".to_string(),
            15,
            "test".to_string(),
        );
        for from in BallStatus::all() {
            for to in BallStatus::all() {
                ball.status = *from;
                ball.set_status(*to);
                assert_eq!(ball.status, *to);
            }
        }
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("in-shop".parse::<BallStatus>().unwrap(), BallStatus::InShop);
        assert_eq!("SOLD".parse::<BallStatus>().unwrap(), BallStatus::Sold);
        assert!("lost".parse::<BallStatus>().is_err());
    }

    #[test]
    fn test_ball_serializes_status() {
        let mut ball = BowlingBall::new(
            "Hammer".to_string(),
            "Black Widow".to_string(),
            14,
            "test".to_string(),
        );
        ball.status = BallStatus::InStock;
        let yaml = serde_yml::to_string(&ball).unwrap();
        assert!(yaml.contains("status: in_stock"));
        assert!(yaml.contains("weight: 14"));
    }
}
