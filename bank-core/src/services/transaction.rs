//! Transaction service - request/response façade over the ledger engine

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Money, RejectionReason, Transaction, TransactionKind, TransactionRequest, TransactionStatus,
};
use crate::services::LedgerEngine;

/// Inbound create-transaction payload
///
/// `id` is the caller's idempotency token; when absent the service
/// generates one, which makes the call non-idempotent across retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub kind: TransactionKind,
    #[serde(default)]
    pub source_account_id: Option<Uuid>,
    #[serde(default)]
    pub destination_account_id: Option<Uuid>,
    pub amount: Money,
}

impl CreateTransactionRequest {
    fn into_request(self) -> TransactionRequest {
        TransactionRequest {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            kind: self.kind,
            source_account_id: self.source_account_id,
            destination_account_id: self.destination_account_id,
            amount: self.amount,
        }
    }
}

/// Outbound transaction shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: String,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_account_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_account_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<RejectionReason>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            kind: tx.kind,
            status: tx.status,
            amount: tx.amount,
            source_account_id: tx.source_account_id,
            destination_account_id: tx.destination_account_id,
            created_at: tx.created_at,
            applied_at: tx.applied_at,
            rejection_reason: tx.rejection_reason,
        }
    }
}

pub trait TransactionService: Send + Sync {
    /// Submit a transaction. Business rejections come back as a REJECTED
    /// response, not as an error.
    fn create_transaction(&self, request: CreateTransactionRequest) -> Result<TransactionResponse>;

    fn get_transaction(&self, id: &str) -> Result<TransactionResponse>;
}

/// `TransactionService` backed by a `LedgerEngine`
pub struct LedgerTransactionService {
    engine: Arc<LedgerEngine>,
}

impl LedgerTransactionService {
    pub fn new(engine: Arc<LedgerEngine>) -> Self {
        Self { engine }
    }
}

impl TransactionService for LedgerTransactionService {
    fn create_transaction(&self, request: CreateTransactionRequest) -> Result<TransactionResponse> {
        let request = request.into_request();
        self.engine.apply(&request).map(TransactionResponse::from)
    }

    fn get_transaction(&self, id: &str) -> Result<TransactionResponse> {
        self.engine
            .get_transaction(id)?
            .map(TransactionResponse::from)
            .ok_or_else(|| Error::not_found(format!("transaction {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryLedgerStore;
    use crate::config::LedgerConfig;
    use crate::domain::Account;
    use crate::ports::AccountStore;

    fn service_with_account(minor: i64) -> (LedgerTransactionService, Uuid) {
        let store = Arc::new(InMemoryLedgerStore::new());
        let mut account = Account::new(Uuid::new_v4(), Uuid::new_v4(), "USD");
        account.balance = Money::from_minor(minor);
        store.insert(&account).unwrap();
        let engine = Arc::new(LedgerEngine::new(store, LedgerConfig::default()).unwrap());
        (LedgerTransactionService::new(engine), account.id)
    }

    #[test]
    fn test_generates_id_when_missing() {
        let (service, account) = service_with_account(0);
        let response = service
            .create_transaction(CreateTransactionRequest {
                id: None,
                kind: TransactionKind::Deposit,
                source_account_id: None,
                destination_account_id: Some(account),
                amount: Money::from_minor(100),
            })
            .unwrap();

        assert!(Uuid::parse_str(&response.id).is_ok());
        assert_eq!(response.status, TransactionStatus::Applied);
        assert_eq!(service.get_transaction(&response.id).unwrap(), response);
    }

    #[test]
    fn test_camel_case_wire_shape() {
        let (service, account) = service_with_account(10);
        let request: CreateTransactionRequest = serde_json::from_value(serde_json::json!({
            "id": "w-1",
            "kind": "WITHDRAWAL",
            "sourceAccountId": account,
            "amount": 50
        }))
        .unwrap();

        let response = service.create_transaction(request).unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "REJECTED");
        assert_eq!(json["rejectionReason"], "InsufficientFunds");
        assert_eq!(json["sourceAccountId"], account.to_string());
        assert!(json.get("appliedAt").is_none());
        assert!(json.get("destinationAccountId").is_none());
    }

    #[test]
    fn test_unknown_transaction_is_not_found() {
        let (service, _) = service_with_account(0);
        assert!(matches!(service.get_transaction("missing"), Err(Error::NotFound(_))));
    }
}
