//! Account service - opening, inspecting and closing accounts

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, Money, TransactionRequest, TransactionStatus};
use crate::ports::{AccountStore, CustomerDirectory};
use crate::services::LedgerEngine;

pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAccountRequest {
    pub customer_id: Uuid,
    #[serde(default)]
    pub currency: Option<String>,
    /// Credited through the ledger as transaction `open-<account id>`
    #[serde(default)]
    pub opening_deposit: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub currency: String,
    pub balance: Money,
    pub version: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            customer_id: account.customer_id,
            currency: account.currency,
            balance: account.balance,
            version: account.version,
            closed_at: account.closed_at,
            created_at: account.created_at,
        }
    }
}

pub trait AccountService: Send + Sync {
    /// Open an account, applying the optional opening deposit through the ledger.
    ///
    /// The account row is written before the deposit. If the deposit then fails
    /// the account exists empty and the error names both ids; resubmitting a
    /// deposit with id `open-<account id>` and the same amount finishes it.
    fn open_account(&self, request: OpenAccountRequest) -> Result<AccountResponse>;

    fn get_account(&self, id: Uuid) -> Result<AccountResponse>;

    /// Close a zero-balance account. Closing a closed account is a no-op.
    fn close_account(&self, id: Uuid) -> Result<AccountResponse>;

    fn list_accounts(&self) -> Result<Vec<AccountResponse>>;
}

/// Id of the transaction that carries an account's opening deposit
pub fn opening_deposit_id(account_id: Uuid) -> String {
    format!("open-{}", account_id)
}

/// Attach the opened account to a failed opening deposit
fn opening_deposit_failed(account_id: Uuid, err: Error) -> Error {
    tracing::warn!(
        account_id = %account_id,
        transaction_id = %opening_deposit_id(account_id),
        error = %err,
        "account opened but its opening deposit did not complete"
    );
    match err {
        Error::StorageUnavailable(msg) => Error::storage(format!(
            "account {} was opened but opening deposit {} did not complete: {}",
            account_id,
            opening_deposit_id(account_id),
            msg
        )),
        // Already names open-<account id>
        other => other,
    }
}

/// `AccountService` over the ledger engine and a customer directory
pub struct LedgerAccountService {
    engine: Arc<LedgerEngine>,
    customers: Arc<dyn CustomerDirectory>,
}

impl LedgerAccountService {
    pub fn new(engine: Arc<LedgerEngine>, customers: Arc<dyn CustomerDirectory>) -> Self {
        Self { engine, customers }
    }
}

impl AccountService for LedgerAccountService {
    fn open_account(&self, request: OpenAccountRequest) -> Result<AccountResponse> {
        if !self.customers.customer_exists(request.customer_id)? {
            return Err(Error::not_found(format!("customer {}", request.customer_id)));
        }
        if let Some(deposit) = request.opening_deposit {
            if !deposit.is_positive() {
                return Err(Error::validation("opening deposit must be positive"));
            }
        }

        let currency = request.currency.as_deref().unwrap_or(DEFAULT_CURRENCY);
        let account = Account::new(Uuid::new_v4(), request.customer_id, currency);
        account.validate().map_err(Error::validation)?;
        self.engine.store().insert(&account)?;
        tracing::info!(account_id = %account.id, currency = %account.currency, "account opened");

        if let Some(amount) = request.opening_deposit {
            let deposit = TransactionRequest::deposit(opening_deposit_id(account.id), account.id, amount);
            let tx = self
                .engine
                .apply(&deposit)
                .map_err(|e| opening_deposit_failed(account.id, e))?;
            if tx.status != TransactionStatus::Applied {
                return Err(Error::storage(format!(
                    "opening deposit {} ended {}",
                    tx.id, tx.status
                )));
            }
        }

        self.get_account(account.id)
    }

    fn get_account(&self, id: Uuid) -> Result<AccountResponse> {
        self.engine.get_account_balance(id).map(AccountResponse::from)
    }

    fn close_account(&self, id: Uuid) -> Result<AccountResponse> {
        let store = self.engine.store();
        let attempts = self.engine.config().max_commit_attempts;

        for _ in 0..attempts {
            let account = self.engine.get_account_balance(id)?;
            if account.is_closed() {
                return Ok(account.into());
            }
            if account.balance != Money::ZERO {
                return Err(Error::validation(format!(
                    "account {} has a balance of {} and cannot be closed",
                    id, account.balance
                )));
            }
            if store.close(id, account.version, Utc::now())? {
                tracing::info!(account_id = %id, "account closed");
                return self.get_account(id);
            }
        }

        Err(Error::ConcurrencyExhausted {
            transaction_id: format!("close-{}", id),
            attempts,
        })
    }

    fn list_accounts(&self) -> Result<Vec<AccountResponse>> {
        Ok(self
            .engine
            .store()
            .list()?
            .into_iter()
            .map(AccountResponse::from)
            .collect())
    }
}
