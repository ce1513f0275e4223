//! In-memory ledger store
//!
//! Same conditional-write semantics as the DuckDB store, kept in process
//! memory. Used by tests and by callers that want a throwaway ledger.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Account, Customer, Money, RejectionReason, Transaction, TransactionStatus,
};
use crate::ports::{
    AccountStore, CommitOutcome, CustomerDirectory, LedgerCommit, LedgerStore, TransactionLog,
};

#[derive(Default)]
struct LedgerState {
    accounts: HashMap<Uuid, Account>,
    transactions: HashMap<String, Transaction>,
    customers: HashMap<Uuid, Customer>,
}

/// Mutex-guarded ledger state
#[derive(Default)]
pub struct InMemoryLedgerStore {
    state: Mutex<LedgerState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerState>> {
        self.state
            .lock()
            .map_err(|e| Error::storage(format!("ledger state lock poisoned: {}", e)))
    }
}

fn oldest_first(txs: &mut [Transaction]) {
    txs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

impl AccountStore for InMemoryLedgerStore {
    fn get(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.lock()?.accounts.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Account>> {
        let mut accounts: Vec<Account> = self.lock()?.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(accounts)
    }

    fn insert(&self, account: &Account) -> Result<()> {
        account.validate().map_err(Error::validation)?;
        let mut state = self.lock()?;
        if state.accounts.contains_key(&account.id) {
            return Err(Error::validation(format!("account {} already exists", account.id)));
        }
        state.accounts.insert(account.id, account.clone());
        Ok(())
    }

    fn compare_and_swap(
        &self,
        id: Uuid,
        expected_version: i64,
        new_balance: Money,
    ) -> Result<bool> {
        if new_balance.is_negative() {
            return Err(Error::validation("balance cannot be negative"));
        }
        let mut state = self.lock()?;
        match state.accounts.get_mut(&id) {
            Some(account) if account.version == expected_version => {
                account.balance = new_balance;
                account.version += 1;
                account.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn close(&self, id: Uuid, expected_version: i64, closed_at: DateTime<Utc>) -> Result<bool> {
        let mut state = self.lock()?;
        match state.accounts.get_mut(&id) {
            Some(account)
                if account.version == expected_version
                    && account.balance == Money::ZERO
                    && !account.is_closed() =>
            {
                account.closed_at = Some(closed_at);
                account.version += 1;
                account.updated_at = closed_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl TransactionLog for InMemoryLedgerStore {
    fn find(&self, id: &str) -> Result<Option<Transaction>> {
        Ok(self.lock()?.transactions.get(id).cloned())
    }

    fn insert_if_absent(&self, tx: &Transaction) -> Result<bool> {
        let mut state = self.lock()?;
        if state.transactions.contains_key(&tx.id) {
            return Ok(false);
        }
        state.transactions.insert(tx.id.clone(), tx.clone());
        Ok(true)
    }

    fn mark_applied(&self, id: &str, applied_at: DateTime<Utc>) -> Result<bool> {
        let mut state = self.lock()?;
        match state.transactions.get_mut(id) {
            Some(tx) if tx.status == TransactionStatus::Pending => {
                tx.status = TransactionStatus::Applied;
                tx.applied_at = Some(applied_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn mark_rejected(&self, id: &str, reason: RejectionReason) -> Result<bool> {
        let mut state = self.lock()?;
        match state.transactions.get_mut(id) {
            Some(tx) if tx.status == TransactionStatus::Pending => {
                tx.status = TransactionStatus::Rejected;
                tx.rejection_reason = Some(reason);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn list_for_account(&self, account_id: Uuid) -> Result<Vec<Transaction>> {
        let mut txs: Vec<Transaction> = self
            .lock()?
            .transactions
            .values()
            .filter(|tx| {
                tx.source_account_id == Some(account_id)
                    || tx.destination_account_id == Some(account_id)
            })
            .cloned()
            .collect();
        oldest_first(&mut txs);
        Ok(txs)
    }

    fn list_pending(&self) -> Result<Vec<Transaction>> {
        let mut txs: Vec<Transaction> = self
            .lock()?
            .transactions
            .values()
            .filter(|tx| tx.status == TransactionStatus::Pending)
            .cloned()
            .collect();
        oldest_first(&mut txs);
        Ok(txs)
    }

    fn count_by_status(&self) -> Result<Vec<(TransactionStatus, i64)>> {
        let state = self.lock()?;
        let counts = [
            TransactionStatus::Applied,
            TransactionStatus::Pending,
            TransactionStatus::Rejected,
        ]
        .into_iter()
        .map(|status| {
            let n = state.transactions.values().filter(|tx| tx.status == status).count();
            (status, n as i64)
        })
        .filter(|(_, n)| *n > 0)
        .collect();
        Ok(counts)
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn commit(&self, commit: &LedgerCommit<'_>) -> Result<CommitOutcome> {
        let mut state = self.lock()?;

        match state.transactions.get(commit.transaction_id) {
            Some(tx) if tx.status == TransactionStatus::Pending => {}
            _ => return Ok(CommitOutcome::AlreadyFinal),
        }

        // Check every precondition before touching anything
        for update in &commit.updates {
            if update.new_balance.is_negative() {
                return Err(Error::validation("balance cannot be negative"));
            }
            match state.accounts.get(&update.account_id) {
                Some(account) if account.version == update.expected_version => {}
                _ => return Ok(CommitOutcome::VersionConflict),
            }
        }

        for update in &commit.updates {
            if let Some(account) = state.accounts.get_mut(&update.account_id) {
                account.balance = update.new_balance;
                account.version += 1;
                account.updated_at = commit.applied_at;
            }
        }
        if let Some(tx) = state.transactions.get_mut(commit.transaction_id) {
            tx.status = TransactionStatus::Applied;
            tx.applied_at = Some(commit.applied_at);
        }

        Ok(CommitOutcome::Committed)
    }
}

impl CustomerDirectory for InMemoryLedgerStore {
    fn customer_exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.lock()?.customers.contains_key(&id))
    }

    fn get_customer(&self, id: Uuid) -> Result<Option<Customer>> {
        Ok(self.lock()?.customers.get(&id).cloned())
    }

    fn add_customer(&self, customer: &Customer) -> Result<()> {
        customer.validate().map_err(Error::validation)?;
        let mut state = self.lock()?;
        if state.customers.contains_key(&customer.id) {
            return Err(Error::validation(format!("customer {} already exists", customer.id)));
        }
        state.customers.insert(customer.id, customer.clone());
        Ok(())
    }

    fn count_customers(&self) -> Result<i64> {
        Ok(self.lock()?.customers.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransactionRequest;
    use crate::ports::BalanceUpdate;

    fn funded(store: &InMemoryLedgerStore, minor: i64) -> Account {
        let mut account = Account::new(Uuid::new_v4(), Uuid::new_v4(), "usd");
        account.balance = Money::from_minor(minor);
        store.insert(&account).unwrap();
        account
    }

    #[test]
    fn test_stale_version_loses() {
        let store = InMemoryLedgerStore::new();
        let account = funded(&store, 100);

        assert!(store.compare_and_swap(account.id, 0, Money::from_minor(50)).unwrap());
        assert!(!store.compare_and_swap(account.id, 0, Money::from_minor(70)).unwrap());
        assert!(!store.compare_and_swap(Uuid::new_v4(), 0, Money::ZERO).unwrap());

        let loaded = store.get(account.id).unwrap().unwrap();
        assert_eq!(loaded.balance, Money::from_minor(50));
        assert_eq!(loaded.version, 1);
    }

    #[test]
    fn test_commit_checks_all_versions_first() {
        let store = InMemoryLedgerStore::new();
        let a = funded(&store, 100);
        let b = funded(&store, 100);
        let tx = Transaction::pending(&TransactionRequest::transfer(
            "T",
            a.id,
            b.id,
            Money::from_minor(10),
        ));
        store.insert_if_absent(&tx).unwrap();
        store.compare_and_swap(b.id, 0, Money::from_minor(100)).unwrap();

        let mut updates = vec![
            BalanceUpdate { account_id: a.id, expected_version: 0, new_balance: Money::from_minor(90) },
            BalanceUpdate { account_id: b.id, expected_version: 0, new_balance: Money::from_minor(110) },
        ];
        updates.sort_by_key(|u| u.account_id);

        let outcome = store
            .commit(&LedgerCommit { transaction_id: "T", applied_at: Utc::now(), updates })
            .unwrap();
        assert_eq!(outcome, CommitOutcome::VersionConflict);
        assert_eq!(store.get(a.id).unwrap().unwrap().version, 0);
        assert_eq!(store.find("T").unwrap().unwrap().status, TransactionStatus::Pending);
    }

    #[test]
    fn test_count_by_status_omits_empty_statuses() {
        let store = InMemoryLedgerStore::new();
        let a = Uuid::new_v4();
        for id in ["A", "B"] {
            let tx = Transaction::pending(&TransactionRequest::deposit(id, a, Money::from_minor(1)));
            store.insert_if_absent(&tx).unwrap();
        }
        store.mark_rejected("B", RejectionReason::AccountNotFound).unwrap();

        let counts = store.count_by_status().unwrap();
        assert_eq!(
            counts,
            vec![(TransactionStatus::Pending, 1), (TransactionStatus::Rejected, 1)]
        );
    }
}
