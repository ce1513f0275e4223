//! Customer domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An account owner. The ledger only needs to know that one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("customer name cannot be empty");
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err("customer email is malformed");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_validation() {
        let mut customer = Customer::new(Uuid::new_v4(), "Thandi");
        assert!(customer.validate().is_ok());

        customer.email = Some("not-an-email".to_string());
        assert!(customer.validate().is_err());

        customer.email = None;
        customer.name = "  ".to_string();
        assert!(customer.validate().is_err());
    }
}
