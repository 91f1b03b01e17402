//! Customer form

use serde::{Deserialize, Serialize};

use super::{is_blank, FieldErrors, Validate};
use crate::entities::customer::Customer;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerDraft {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl CustomerDraft {
    pub fn from_customer(customer: &Customer) -> Self {
        Self {
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            address: customer.address.clone(),
            notes: customer.notes.clone(),
        }
    }

    /// Build the customer; blank optional fields are dropped
    pub fn into_customer(self, author: String, pro_shop_id: String) -> Customer {
        let keep = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let mut customer = Customer::new(self.name.trim().to_string(), author);
        customer.email = keep(self.email);
        customer.phone = keep(self.phone);
        customer.address = keep(self.address);
        customer.notes = keep(self.notes);
        customer.pro_shop_id = pro_shop_id;
        customer
    }
}

impl Validate for CustomerDraft {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if is_blank(&self.name) {
            errors.insert("name", "Name is required");
        }

        if let Some(email) = self.email.as_deref().filter(|e| !is_blank(e)) {
            if !email.contains('@') {
                errors.insert("email", "Email address is not valid");
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_rules() {
        let mut draft = CustomerDraft::default();
        assert!(draft.validate().contains("name"));

        draft.name = "Pat Rivera".to_string();
        draft.email = Some("pat.example.com".to_string());
        assert!(draft.validate().contains("email"));

        draft.email = Some("pat@example.com".to_string());
        assert!(draft.validate().is_empty());

        draft.email = Some(" ".to_string());
        assert!(draft.validate().is_empty());
    }

    #[test]
    fn test_into_customer_drops_blank_fields() {
        let draft = CustomerDraft {
            name: " Pat Rivera ".to_string(),
            phone: Some("".to_string()),
            ..CustomerDraft::default()
        };
        let customer = draft.into_customer("test".to_string(), "main".to_string());
        assert_eq!(customer.name, "Pat Rivera");
        assert!(customer.phone.is_none());
    }
}
