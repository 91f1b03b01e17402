//! Form drafts and their pre-save validation
//!
//! A draft holds the user's current input for a record. Validation runs
//! every rule and collects all failures into [`FieldErrors`]; it never
//! fails itself.

pub mod ball;
pub mod customer;
pub mod drill_sheet;
pub mod work_order;

use std::collections::BTreeMap;

use crate::core::entity::Entity;
use crate::core::identity::EntityPrefix;
use crate::entities::{BowlingBall, Customer, DrillSheet, Employee, Location, WorkOrder};

pub use ball::BallDraft;
pub use customer::CustomerDraft;
pub use drill_sheet::DrillSheetDraft;
pub use work_order::WorkOrderDraft;

/// Field path -> message, for every rule a draft violates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure; the first message for a field wins
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Ok when empty, otherwise the errors themselves
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", field, message)?;
        }
        Ok(())
    }
}

/// A form whose values can be checked before save
pub trait Validate {
    fn validate(&self) -> FieldErrors;
}

/// Apply the form rules of a record type to a stored document
///
/// Drill sheets are migrated before they are checked. Fails only when the
/// document does not decode as its record type.
pub fn check_document(
    prefix: EntityPrefix,
    value: serde_json::Value,
) -> Result<FieldErrors, serde_json::Error> {
    let errors = match prefix {
        EntityPrefix::Cust => CustomerDraft::from_customer(&Customer::from_value(value)?).validate(),
        EntityPrefix::Ball => BallDraft::from_ball(&BowlingBall::from_value(value)?).validate(),
        EntityPrefix::Drl => DrillSheetDraft::from_sheet(&DrillSheet::from_value(value)?).validate(),
        EntityPrefix::Wo => {
            WorkOrderDraft::from_work_order(&WorkOrder::from_value(value)?).validate()
        }
        EntityPrefix::Emp => {
            let employee = Employee::from_value(value)?;
            let mut errors = FieldErrors::new();
            if is_blank(&employee.name) {
                errors.insert("name", "Name is required");
            }
            if employee.hourly_rate.is_some_and(|r| !(r.is_finite() && r >= 0.0)) {
                errors.insert("hourly_rate", "Hourly rate must be zero or more");
            }
            errors
        }
        EntityPrefix::Loc => {
            let location = Location::from_value(value)?;
            let mut errors = FieldErrors::new();
            if is_blank(&location.name) {
                errors.insert("name", "Name is required");
            }
            errors
        }
    };
    Ok(errors)
}

/// Trimmed, non-empty text
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub(crate) fn is_blank_opt(value: Option<&str>) -> bool {
    value.map_or(true, is_blank)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_keep_first_message() {
        let mut errors = FieldErrors::new();
        errors.insert("name", "Name is required");
        errors.insert("name", "second");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("name"), Some("Name is required"));
    }

    #[test]
    fn test_field_errors_display_is_sorted() {
        let mut errors = FieldErrors::new();
        errors.insert("weight", "Weight is required");
        errors.insert("brand", "Brand is required");
        assert_eq!(
            errors.to_string(),
            "brand: Brand is required\nweight: Weight is required"
        );
        assert!(errors.into_result().is_err());
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_check_document_applies_form_rules() {
        let mut ball = BowlingBall::new("Storm".into(), "Phaze II".into(), 17, "test".into());
        ball.pro_shop_id = "main".into();
        let value = serde_json::to_value(&ball).unwrap();
        let errors = check_document(EntityPrefix::Ball, value).unwrap();
        assert!(errors.contains("weight"));

        let customer = Customer::new("Pat".into(), "test".into());
        let value = serde_json::to_value(&customer).unwrap();
        assert!(check_document(EntityPrefix::Cust, value).unwrap().is_empty());
    }

    #[test]
    fn test_check_document_rejects_wrong_shape() {
        let value = serde_json::json!({ "name": "no id" });
        assert!(check_document(EntityPrefix::Loc, value).is_err());
    }
}
