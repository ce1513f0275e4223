//! Ledger storage ports
//!
//! The engine only ever mutates balances through these traits. Every write is
//! conditional: balances on the version the caller read, transaction status
//! on the record still being PENDING.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{
    Account, Customer, Money, RejectionReason, Transaction, TransactionStatus,
};

/// Keyed account storage
pub trait AccountStore: Send + Sync {
    /// Get account by ID
    fn get(&self, id: Uuid) -> Result<Option<Account>>;

    /// Get all accounts
    fn list(&self) -> Result<Vec<Account>>;

    /// Add a new account. Fails if the id is taken.
    fn insert(&self, account: &Account) -> Result<()>;

    /// Replace the balance iff the stored version equals `expected_version`.
    /// On success the version becomes `expected_version + 1`.
    fn compare_and_swap(&self, id: Uuid, expected_version: i64, new_balance: Money)
        -> Result<bool>;

    /// Mark the account closed iff the version matches and the balance is zero
    fn close(&self, id: Uuid, expected_version: i64, closed_at: DateTime<Utc>) -> Result<bool>;
}

/// Append-only transaction records keyed by idempotency token
pub trait TransactionLog: Send + Sync {
    /// Get transaction by ID
    fn find(&self, id: &str) -> Result<Option<Transaction>>;

    /// Insert a new record. Returns false (and writes nothing) if the id exists.
    fn insert_if_absent(&self, tx: &Transaction) -> Result<bool>;

    /// PENDING -> APPLIED. Returns false if the record is missing or terminal.
    fn mark_applied(&self, id: &str, applied_at: DateTime<Utc>) -> Result<bool>;

    /// PENDING -> REJECTED. Returns false if the record is missing or terminal.
    fn mark_rejected(&self, id: &str, reason: RejectionReason) -> Result<bool>;

    /// Transactions touching an account, oldest first
    fn list_for_account(&self, account_id: Uuid) -> Result<Vec<Transaction>>;

    /// Transactions still PENDING, oldest first
    fn list_pending(&self) -> Result<Vec<Transaction>>;

    /// Number of records per status (statuses with no records are omitted)
    fn count_by_status(&self) -> Result<Vec<(TransactionStatus, i64)>>;
}

/// One conditional balance write inside a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceUpdate {
    pub account_id: Uuid,
    pub expected_version: i64,
    pub new_balance: Money,
}

/// Everything that must become visible together when a transaction applies
#[derive(Debug, Clone)]
pub struct LedgerCommit<'a> {
    pub transaction_id: &'a str,
    pub applied_at: DateTime<Utc>,
    /// Ordered by account id
    pub updates: Vec<BalanceUpdate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// An account moved past the expected version; nothing was written
    VersionConflict,
    /// The transaction was finalized by someone else; nothing was written
    AlreadyFinal,
}

/// Storage that can commit balance updates and a transaction atomically
pub trait LedgerStore: AccountStore + TransactionLog {
    fn commit(&self, commit: &LedgerCommit<'_>) -> Result<CommitOutcome>;
}

/// Customer existence lookups for the account-opening flow
pub trait CustomerDirectory: Send + Sync {
    fn customer_exists(&self, id: Uuid) -> Result<bool>;

    fn get_customer(&self, id: Uuid) -> Result<Option<Customer>>;

    fn add_customer(&self, customer: &Customer) -> Result<()>;

    fn count_customers(&self) -> Result<i64>;
}
