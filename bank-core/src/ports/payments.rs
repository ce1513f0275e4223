//! Outbound payments port
//!
//! Typed interface to the external payments service. The ledger does not
//! call it itself; it is the seam for moving money out of the bank.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::Money;

/// A payment to submit to the external payments service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInstruction {
    /// Caller reference, reused as the payment's idempotency key
    pub reference: String,
    pub debtor_account_id: Uuid,
    pub creditor_iban: String,
    pub amount: Money,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Accepted,
    Settled,
    Failed,
}

/// The service's acknowledgement of a payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub payment_id: String,
    pub reference: String,
    pub status: PaymentStatus,
}

/// Payments service client
pub trait PaymentClient: Send + Sync {
    /// Submit a payment instruction
    fn submit_payment(&self, instruction: &PaymentInstruction) -> Result<PaymentReceipt>;

    /// Look up a previously submitted payment
    fn get_payment(&self, payment_id: &str) -> Result<PaymentReceipt>;
}
