//! Account domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::Money;

/// A customer-owned ledger account
///
/// Accounts are never physically deleted. `balance` only moves through the
/// store's versioned conditional write, and `version` increases by exactly
/// one on every committed mutation (including closing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub customer_id: Uuid,
    /// ISO 4217 currency code, normalized to uppercase
    pub currency: String,
    pub balance: Money,
    pub version: i64,
    /// Set once when the account is closed
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new, empty account
    pub fn new(id: Uuid, customer_id: Uuid, currency: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            customer_id,
            currency: Self::normalize_currency(currency),
            balance: Money::ZERO,
            version: 0,
            closed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Normalize currency code to uppercase
    pub fn normalize_currency(currency: &str) -> String {
        currency.trim().to_uppercase()
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// Validate account data
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err("currency must be a three-letter ISO 4217 code");
        }
        if self.balance.is_negative() {
            return Err("balance cannot be negative");
        }
        if self.version < 0 {
            return Err("version cannot be negative");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_normalization() {
        assert_eq!(Account::normalize_currency("usd"), "USD");
        assert_eq!(Account::normalize_currency(" eur "), "EUR");
    }

    #[test]
    fn test_new_account_starts_empty_and_open() {
        let account = Account::new(Uuid::new_v4(), Uuid::new_v4(), "zar");
        assert_eq!(account.balance, Money::ZERO);
        assert_eq!(account.version, 0);
        assert_eq!(account.currency, "ZAR");
        assert!(!account.is_closed());
    }

    #[test]
    fn test_account_validation() {
        let mut account = Account::new(Uuid::new_v4(), Uuid::new_v4(), "USD");
        assert!(account.validate().is_ok());

        account.currency = "DOLLARS".to_string();
        assert!(account.validate().is_err());

        account.currency = "USD".to_string();
        account.balance = Money::from_minor(-1);
        assert!(account.validate().is_err());
    }
}
