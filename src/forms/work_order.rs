//! Work-order form

use serde::{Deserialize, Serialize};

use super::{is_blank, FieldErrors, Validate};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::work_order::{WorkOrder, WorkType};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkOrderDraft {
    pub description: String,
    pub customer_id: Option<EntityId>,
    pub ball_id: Option<EntityId>,
    pub drill_sheet_id: Option<EntityId>,
    pub employee_id: Option<EntityId>,
    pub location_id: Option<EntityId>,
    pub work_type: WorkType,
    pub labor_hours: Option<f64>,
    /// Manual labor cost; replaced when hours and a rate are known
    pub labor_cost: Option<f64>,
    pub materials_cost: Option<f64>,
    pub quality_checked: bool,
    pub satisfaction: Option<u8>,
    pub notes: Option<String>,
}

impl WorkOrderDraft {
    /// Current values of an existing work order, for re-validation
    pub fn from_work_order(wo: &WorkOrder) -> Self {
        Self {
            description: wo.description.clone(),
            customer_id: Some(wo.customer_id.clone()),
            ball_id: wo.ball_id.clone(),
            drill_sheet_id: wo.drill_sheet_id.clone(),
            employee_id: wo.employee_id.clone(),
            location_id: wo.location_id.clone(),
            work_type: wo.work_type,
            labor_hours: wo.labor_hours,
            labor_cost: wo.labor_cost,
            materials_cost: wo.materials_cost,
            quality_checked: wo.quality_checked,
            satisfaction: wo.satisfaction,
            notes: wo.notes.clone(),
        }
    }

    /// Build the work order, deriving costs from the employee's hourly rate
    ///
    /// Returns `None` if the draft has no customer; validate first.
    pub fn into_work_order(
        self,
        author: String,
        pro_shop_id: String,
        hourly_rate: Option<f64>,
    ) -> Option<WorkOrder> {
        let customer_id = self.customer_id?;
        let mut wo = WorkOrder::new(self.description.trim().to_string(), customer_id, author);
        wo.ball_id = self.ball_id;
        wo.drill_sheet_id = self.drill_sheet_id;
        wo.location_id = self.location_id;
        wo.work_type = self.work_type;
        wo.quality_checked = self.quality_checked;
        wo.satisfaction = self.satisfaction;
        wo.notes = self.notes.filter(|n| !is_blank(n));
        wo.pro_shop_id = pro_shop_id;

        wo.set_labor_cost(self.labor_cost);
        wo.set_materials_cost(self.materials_cost);
        wo.labor_hours = self.labor_hours;
        wo.assign_employee(self.employee_id, hourly_rate);
        Some(wo)
    }
}

impl Validate for WorkOrderDraft {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if is_blank(&self.description) {
            errors.insert("description", "Description is required");
        }

        match &self.customer_id {
            None => errors.insert("customer_id", "Customer is required"),
            Some(id) if id.prefix() != EntityPrefix::Cust => {
                errors.insert("customer_id", format!("{} is not a customer", id))
            }
            Some(_) => {}
        }

        if let Some(id) = &self.employee_id {
            if id.prefix() != EntityPrefix::Emp {
                errors.insert("employee_id", format!("{} is not an employee", id));
            }
        }

        for (field, value) in [
            ("labor_hours", self.labor_hours),
            ("labor_cost", self.labor_cost),
            ("materials_cost", self.materials_cost),
        ] {
            if let Some(v) = value {
                if !(v.is_finite() && v >= 0.0) {
                    errors.insert(field, "Must be zero or more");
                }
            }
        }

        if let Some(score) = self.satisfaction {
            if !(1..=5).contains(&score) {
                errors.insert("satisfaction", "Satisfaction must be between 1 and 5");
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> WorkOrderDraft {
        WorkOrderDraft {
            description: "Drill Phaze II".to_string(),
            customer_id: Some(EntityId::new(EntityPrefix::Cust)),
            ..WorkOrderDraft::default()
        }
    }

    #[test]
    fn test_work_order_rules() {
        assert!(draft().validate().is_empty());

        let bad = WorkOrderDraft {
            labor_hours: Some(-1.0),
            satisfaction: Some(6),
            customer_id: Some(EntityId::new(EntityPrefix::Ball)),
            ..draft()
        };
        let errors = bad.validate();
        assert!(errors.contains("labor_hours"));
        assert!(errors.contains("satisfaction"));
        assert!(errors.contains("customer_id"));
    }

    #[test]
    fn test_into_work_order_derives_costs() {
        let wo = WorkOrderDraft {
            employee_id: Some(EntityId::new(EntityPrefix::Emp)),
            labor_hours: Some(0.5),
            labor_cost: Some(100.0),
            materials_cost: Some(10.0),
            ..draft()
        }
        .into_work_order("test".to_string(), "main".to_string(), Some(40.0))
        .unwrap();

        assert_eq!(wo.labor_cost, Some(20.0));
        assert_eq!(wo.total_cost, 30.0);
    }

    #[test]
    fn test_manual_labor_cost_without_employee() {
        let wo = WorkOrderDraft {
            labor_hours: Some(0.5),
            labor_cost: Some(15.0),
            ..draft()
        }
        .into_work_order("test".to_string(), "main".to_string(), None)
        .unwrap();

        assert_eq!(wo.labor_cost, Some(15.0));
        assert_eq!(wo.total_cost, 15.0);
    }
}
