//! Ledger engine - applies transactions to account balances
//!
//! `apply` is safe to call concurrently and safe to retry:
//!
//! 1. The request id is an idempotency token. A terminal record under that id
//!    is returned unchanged; a PENDING one is resumed.
//! 2. Accounts are read in ascending id order and the request is evaluated
//!    against that snapshot. Business failures finalize the record as
//!    REJECTED and are returned as data.
//! 3. Balance updates and the APPLIED transition go to the store as one
//!    commit, each update conditioned on the version that was read. A version
//!    conflict rereads and retries, with jittered exponential backoff, up to
//!    `max_commit_attempts` times.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::domain::result::{Error, Result};
use crate::domain::{Account, Money, RejectionReason, Transaction, TransactionKind, TransactionRequest};
use crate::ports::{
    AccountStore, BalanceUpdate, CommitOutcome, LedgerCommit, LedgerStore, TransactionLog,
};

/// Upper bound for a single backoff sleep
const MAX_BACKOFF_MS: u64 = 250;

/// What a request would do against one snapshot of its accounts
#[derive(Debug)]
enum Evaluation {
    Reject(RejectionReason),
    Commit(Vec<BalanceUpdate>),
}

pub struct LedgerEngine {
    store: Arc<dyn LedgerStore>,
    config: LedgerConfig,
}

impl LedgerEngine {
    pub fn new(store: Arc<dyn LedgerStore>, config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    /// Apply a transaction request, exactly once per transaction id
    pub fn apply(&self, request: &TransactionRequest) -> Result<Transaction> {
        request.validate()?;

        if let Some(existing) = self.admit(request)? {
            return Ok(existing);
        }

        let max_attempts = self.config.max_commit_attempts;
        for attempt in 1..=max_attempts {
            let current = self.reload(&request.id)?;
            if current.is_terminal() {
                return Ok(current);
            }

            tracing::debug!(transaction_id = %request.id, attempt, "evaluating transaction");
            match self.evaluate(request)? {
                Evaluation::Reject(reason) => {
                    if self.store.mark_rejected(&request.id, reason)? {
                        tracing::info!(
                            transaction_id = %request.id,
                            reason = %reason,
                            "transaction rejected"
                        );
                    }
                    return self.reload(&request.id);
                }
                Evaluation::Commit(updates) => {
                    let commit = LedgerCommit {
                        transaction_id: &request.id,
                        applied_at: Utc::now(),
                        updates,
                    };
                    match self.store.commit(&commit)? {
                        CommitOutcome::Committed => {
                            tracing::info!(
                                transaction_id = %request.id,
                                kind = %request.kind,
                                attempt,
                                "transaction applied"
                            );
                            return self.reload(&request.id);
                        }
                        CommitOutcome::AlreadyFinal => return self.reload(&request.id),
                        CommitOutcome::VersionConflict => {
                            tracing::warn!(
                                transaction_id = %request.id,
                                attempt,
                                max_attempts,
                                "version conflict on commit"
                            );
                            if attempt < max_attempts {
                                thread::sleep(self.backoff(attempt));
                            }
                        }
                    }
                }
            }
        }

        tracing::warn!(
            transaction_id = %request.id,
            attempts = max_attempts,
            "giving up after repeated version conflicts"
        );
        Err(Error::ConcurrencyExhausted {
            transaction_id: request.id.clone(),
            attempts: max_attempts,
        })
    }

    /// Current state of an account
    pub fn get_account_balance(&self, account_id: Uuid) -> Result<Account> {
        self.store
            .get(account_id)?
            .ok_or_else(|| Error::not_found(format!("account {}", account_id)))
    }

    /// Look up a transaction record by id
    pub fn get_transaction(&self, id: &str) -> Result<Option<Transaction>> {
        self.store.find(id)
    }

    /// Make sure a PENDING record exists for this request.
    ///
    /// Returns the stored record when it is already terminal.
    fn admit(&self, request: &TransactionRequest) -> Result<Option<Transaction>> {
        let existing = match self.store.find(&request.id)? {
            Some(existing) => existing,
            None => {
                if self.store.insert_if_absent(&Transaction::pending(request))? {
                    return Ok(None);
                }
                // Another caller inserted it between our find and insert
                self.reload(&request.id)?
            }
        };

        if existing.is_terminal() {
            tracing::debug!(
                transaction_id = %request.id,
                status = %existing.status,
                "replay of finalized transaction"
            );
            return Ok(Some(existing));
        }
        if !existing.matches(request) {
            return Err(Error::validation(format!(
                "transaction id '{}' is already in use by a different request",
                request.id
            )));
        }
        Ok(None)
    }

    fn reload(&self, id: &str) -> Result<Transaction> {
        self.store
            .find(id)?
            .ok_or_else(|| Error::storage(format!("transaction {} disappeared from the log", id)))
    }

    /// Read the touched accounts in id order and work out the new balances
    fn evaluate(&self, request: &TransactionRequest) -> Result<Evaluation> {
        let mut accounts = Vec::with_capacity(2);
        for id in request.account_ids() {
            match self.store.get(id)? {
                Some(account) => accounts.push(account),
                None => return Ok(Evaluation::Reject(RejectionReason::AccountNotFound)),
            }
        }

        if accounts.iter().any(Account::is_closed) {
            return Ok(Evaluation::Reject(RejectionReason::AccountClosed));
        }
        if request.kind == TransactionKind::Transfer
            && accounts.windows(2).any(|pair| pair[0].currency != pair[1].currency)
        {
            return Ok(Evaluation::Reject(RejectionReason::CurrencyMismatch));
        }

        // Debits first: InsufficientFunds outranks BalanceOverflow
        let mut balances: Vec<Money> = accounts.iter().map(|a| a.balance).collect();
        for (account, balance) in accounts.iter().zip(balances.iter_mut()) {
            if request.source_account_id == Some(account.id) {
                *balance = match balance.checked_sub(request.amount) {
                    Some(b) if !b.is_negative() => b,
                    _ => return Ok(Evaluation::Reject(RejectionReason::InsufficientFunds)),
                };
            }
        }
        for (account, balance) in accounts.iter().zip(balances.iter_mut()) {
            if request.destination_account_id == Some(account.id) {
                *balance = match balance.checked_add(request.amount) {
                    Some(b) => b,
                    None => return Ok(Evaluation::Reject(RejectionReason::BalanceOverflow)),
                };
            }
        }

        let updates = accounts
            .iter()
            .zip(balances)
            .map(|(account, new_balance)| BalanceUpdate {
                account_id: account.id,
                expected_version: account.version,
                new_balance,
            })
            .collect();

        Ok(Evaluation::Commit(updates))
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let base = self
            .config
            .retry_backoff_ms
            .saturating_mul(1u64 << (attempt - 1).min(16))
            .min(MAX_BACKOFF_MS);
        let jitter = rand::thread_rng().gen_range(0..=base);
        Duration::from_millis(base / 2 + jitter / 2)
    }
}

/// Sum of balances, for conservation checks
pub fn total_balance(accounts: &[Account]) -> Option<Money> {
    accounts
        .iter()
        .try_fold(Money::ZERO, |acc, account| acc.checked_add(account.balance))
}
