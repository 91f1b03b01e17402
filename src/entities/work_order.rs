//! Work order entity type
//!
//! Work orders carry the shop's only derived values: labor cost from the
//! assigned employee's hourly rate, and the total of labor and materials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// Kind of work performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    Drill,
    PlugAndRedrill,
    Resurface,
    InsertFit,
    Other,
}

impl Default for WorkType {
    fn default() -> Self {
        WorkType::Drill
    }
}

impl std::fmt::Display for WorkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkType::Drill => write!(f, "drill"),
            WorkType::PlugAndRedrill => write!(f, "plug_and_redrill"),
            WorkType::Resurface => write!(f, "resurface"),
            WorkType::InsertFit => write!(f, "insert_fit"),
            WorkType::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for WorkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "drill" => Ok(WorkType::Drill),
            "plug_and_redrill" | "plug" | "redrill" => Ok(WorkType::PlugAndRedrill),
            "resurface" => Ok(WorkType::Resurface),
            "insert_fit" | "inserts" => Ok(WorkType::InsertFit),
            "other" => Ok(WorkType::Other),
            _ => Err(format!(
                "Invalid work type: {}. Use drill, plug_and_redrill, resurface, insert_fit, or other",
                s
            )),
        }
    }
}

/// Labor cost for `hours` at `hourly_rate`, when both are known
pub fn derive_labor_cost(hours: Option<f64>, hourly_rate: Option<f64>) -> Option<f64> {
    match (hours, hourly_rate) {
        (Some(hours), Some(rate)) => Some(hours * rate),
        _ => None,
    }
}

/// A work order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    /// Unique identifier (WO-xxx)
    pub id: EntityId,

    /// What was done
    pub description: String,

    pub customer_id: EntityId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ball_id: Option<EntityId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drill_sheet_id: Option<EntityId>,

    /// Performing employee
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<EntityId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<EntityId>,

    #[serde(default)]
    pub work_type: WorkType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor_hours: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor_cost: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials_cost: Option<f64>,

    /// labor_cost + materials_cost; derived, never set directly
    #[serde(default)]
    pub total_cost: f64,

    #[serde(default)]
    pub quality_checked: bool,

    /// Customer satisfaction score, 1-5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfaction: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub pro_shop_id: String,

    pub created: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    pub author: String,
}

impl Entity for WorkOrder {
    const PREFIX: EntityPrefix = EntityPrefix::Wo;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.description
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
        Some(&self.customer_id)
    }
}

impl WorkOrder {
    pub fn new(description: String, customer_id: EntityId, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Wo),
            description,
            customer_id,
            ball_id: None,
            drill_sheet_id: None,
            employee_id: None,
            location_id: None,
            work_type: WorkType::default(),
            labor_hours: None,
            labor_cost: None,
            materials_cost: None,
            total_cost: 0.0,
            quality_checked: false,
            satisfaction: None,
            notes: None,
            pro_shop_id: String::new(),
            created: Utc::now(),
            updated: None,
            author,
        }
    }

    /// Assign the performing employee along with their hourly rate
    ///
    /// Labor cost is re-derived and overwrites any manual value when the
    /// rate and hours are both known.
    pub fn assign_employee(&mut self, employee_id: Option<EntityId>, hourly_rate: Option<f64>) {
        self.employee_id = employee_id;
        self.apply_rate(hourly_rate);
    }

    /// Set labor hours, re-deriving labor cost from the given rate
    pub fn set_labor_hours(&mut self, hours: Option<f64>, hourly_rate: Option<f64>) {
        self.labor_hours = hours;
        self.apply_rate(hourly_rate);
    }

    /// Manually enter labor cost
    ///
    /// Kept only until the hours or employee change again.
    pub fn set_labor_cost(&mut self, cost: Option<f64>) {
        self.labor_cost = cost;
        self.recompute_total();
    }

    pub fn set_materials_cost(&mut self, cost: Option<f64>) {
        self.materials_cost = cost;
        self.recompute_total();
    }

    fn apply_rate(&mut self, hourly_rate: Option<f64>) {
        let rate = self.employee_id.as_ref().and(hourly_rate);
        if let Some(cost) = derive_labor_cost(self.labor_hours, rate) {
            self.labor_cost = Some(cost);
        }
        self.recompute_total();
    }

    /// total = labor + materials, missing terms counting as zero
    pub fn recompute_total(&mut self) {
        self.total_cost = self.labor_cost.unwrap_or(0.0) + self.materials_cost.unwrap_or(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> WorkOrder {
        WorkOrder::new(
            "Drill new ball".to_string(),
            EntityId::new(EntityPrefix::Cust),
            "test".to_string(),
        )
    }

    #[test]
    fn test_labor_cost_derived_from_rate() {
        let mut wo = order();
        wo.assign_employee(Some(EntityId::new(EntityPrefix::Emp)), Some(30.0));
        assert_eq!(wo.labor_cost, None);

        wo.set_labor_hours(Some(1.5), Some(30.0));
        assert_eq!(wo.labor_cost, Some(45.0));
        assert_eq!(wo.total_cost, 45.0);

        wo.set_materials_cost(Some(12.5));
        assert_eq!(wo.total_cost, 57.5);
    }

    #[test]
    fn test_hours_change_overwrites_manual_labor_cost() {
        let mut wo = order();
        wo.assign_employee(Some(EntityId::new(EntityPrefix::Emp)), Some(20.0));
        wo.set_labor_cost(Some(99.0));
        assert_eq!(wo.total_cost, 99.0);

        wo.set_labor_hours(Some(2.0), Some(20.0));
        assert_eq!(wo.labor_cost, Some(40.0));
        assert_eq!(wo.total_cost, 40.0);
    }

    #[test]
    fn test_manual_labor_cost_kept_without_rate() {
        let mut wo = order();
        wo.set_labor_cost(Some(25.0));
        wo.set_labor_hours(Some(3.0), None);
        assert_eq!(wo.labor_cost, Some(25.0));
        assert_eq!(wo.total_cost, 25.0);
    }

    #[test]
    fn test_total_counts_missing_terms_as_zero() {
        let mut wo = order();
        wo.set_materials_cost(Some(8.0));
        assert_eq!(wo.total_cost, 8.0);
        wo.set_materials_cost(None);
        assert_eq!(wo.total_cost, 0.0);
    }

    #[test]
    fn test_derive_labor_cost_needs_both_inputs() {
        assert_eq!(derive_labor_cost(Some(2.0), Some(10.0)), Some(20.0));
        assert_eq!(derive_labor_cost(None, Some(10.0)), None);
        assert_eq!(derive_labor_cost(Some(2.0), None), None);
    }
}
