//! Statement service - per-account CSV statements

use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, Money, TransactionStatus};
use crate::ports::{AccountStore, LedgerStore, TransactionLog};

/// One statement row. Only APPLIED rows move the running balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementLine {
    pub date: DateTime<Utc>,
    pub transaction_id: String,
    pub kind: String,
    pub status: String,
    pub debit: Option<Money>,
    pub credit: Option<Money>,
    pub balance: Money,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Statement {
    pub account: Account,
    pub lines: Vec<StatementLine>,
}

/// CSV layout of a statement line
#[derive(Serialize)]
struct CsvRow<'a> {
    date: String,
    transaction_id: &'a str,
    kind: &'a str,
    status: &'a str,
    debit: String,
    credit: String,
    balance: String,
    note: &'a str,
}

pub struct StatementService {
    store: Arc<dyn LedgerStore>,
}

impl StatementService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub fn statement(&self, account_id: Uuid) -> Result<Statement> {
        let account = self
            .store
            .get(account_id)?
            .ok_or_else(|| Error::not_found(format!("account {}", account_id)))?;

        // Balances move in commit order; a resumed PENDING record is dated by its commit
        let mut history = self.store.list_for_account(account_id)?;
        history.sort_by(|a, b| {
            a.applied_at
                .unwrap_or(a.created_at)
                .cmp(&b.applied_at.unwrap_or(b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut balance = Money::ZERO;
        let mut lines = Vec::new();
        for tx in history {
            let effect = tx.net_effect_on(account_id);
            balance = balance
                .checked_add(effect)
                .ok_or_else(|| Error::storage(format!("running balance overflow at {}", tx.id)))?;

            let (debit, credit) = if tx.status != TransactionStatus::Applied {
                (None, None)
            } else if tx.source_account_id == Some(account_id) {
                (Some(tx.amount), None)
            } else {
                (None, Some(tx.amount))
            };

            lines.push(StatementLine {
                date: tx.applied_at.unwrap_or(tx.created_at),
                transaction_id: tx.id,
                kind: tx.kind.to_string(),
                status: tx.status.to_string(),
                debit,
                credit,
                balance,
                note: tx.rejection_reason.map(|r| r.to_string()),
            });
        }

        Ok(Statement { account, lines })
    }

    /// Write the statement as CSV; returns the number of rows written
    pub fn write_csv<W: Write>(&self, account_id: Uuid, writer: W) -> Result<usize> {
        let statement = self.statement(account_id)?;
        let mut csv = csv::Writer::from_writer(writer);

        for line in &statement.lines {
            csv.serialize(CsvRow {
                date: line.date.format("%Y-%m-%d %H:%M:%S").to_string(),
                transaction_id: &line.transaction_id,
                kind: &line.kind,
                status: &line.status,
                debit: line.debit.map(|m| m.to_string()).unwrap_or_default(),
                credit: line.credit.map(|m| m.to_string()).unwrap_or_default(),
                balance: line.balance.to_string(),
                note: line.note.as_deref().unwrap_or(""),
            })
            .map_err(|e| Error::Io(e.into()))?;
        }
        csv.flush()?;
        Ok(statement.lines.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryLedgerStore;
    use crate::config::LedgerConfig;
    use crate::domain::{Transaction, TransactionRequest};
    use crate::services::LedgerEngine;

    #[test]
    fn test_statement_running_balance_and_csv() {
        let store = Arc::new(InMemoryLedgerStore::new());
        let a = Account::new(Uuid::new_v4(), Uuid::new_v4(), "USD");
        let b = Account::new(Uuid::new_v4(), Uuid::new_v4(), "USD");
        store.insert(&a).unwrap();
        store.insert(&b).unwrap();

        let engine = LedgerEngine::new(store.clone(), LedgerConfig::default()).unwrap();
        engine.apply(&TransactionRequest::deposit("1-dep", a.id, Money::from_minor(1000))).unwrap();
        engine.apply(&TransactionRequest::transfer("2-xfer", a.id, b.id, Money::from_minor(250))).unwrap();
        engine.apply(&TransactionRequest::withdrawal("3-big", a.id, Money::from_minor(99_999))).unwrap();

        let service = StatementService::new(store);
        let statement = service.statement(a.id).unwrap();
        let balances: Vec<i64> = statement.lines.iter().map(|l| l.balance.minor()).collect();
        assert_eq!(balances, vec![1000, 750, 750]);
        assert_eq!(statement.lines[1].debit, Some(Money::from_minor(250)));
        assert_eq!(statement.lines[2].note.as_deref(), Some("InsufficientFunds"));

        let mut out = Vec::new();
        assert_eq!(service.write_csv(a.id, &mut out).unwrap(), 3);
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("date,transaction_id,kind,status,debit,credit,balance,note")
        );
        assert!(text.contains("2-xfer,TRANSFER,APPLIED,2.50,,7.50,"));
        assert!(text.contains("3-big,WITHDRAWAL,REJECTED,,,7.50,InsufficientFunds"));
    }

    #[test]
    fn test_resumed_pending_is_placed_at_its_commit() {
        let store = Arc::new(InMemoryLedgerStore::new());
        let a = Account::new(Uuid::new_v4(), Uuid::new_v4(), "USD");
        store.insert(&a).unwrap();
        let engine = LedgerEngine::new(store.clone(), LedgerConfig::default()).unwrap();

        // Left PENDING by an earlier attempt, finished after a later deposit
        let early = TransactionRequest::withdrawal("w-early", a.id, Money::from_minor(100));
        assert!(store.insert_if_absent(&Transaction::pending(&early)).unwrap());
        engine.apply(&TransactionRequest::deposit("d-later", a.id, Money::from_minor(100))).unwrap();
        assert_eq!(engine.apply(&early).unwrap().status, TransactionStatus::Applied);

        let statement = StatementService::new(store).statement(a.id).unwrap();
        let rows: Vec<(&str, i64)> = statement
            .lines
            .iter()
            .map(|l| (l.transaction_id.as_str(), l.balance.minor()))
            .collect();
        assert_eq!(rows, vec![("d-later", 100), ("w-early", 0)]);
        assert!(statement.lines[0].date <= statement.lines[1].date);
    }

    #[test]
    fn test_statement_for_unknown_account() {
        let service = StatementService::new(Arc::new(InMemoryLedgerStore::new()));
        assert!(matches!(service.statement(Uuid::new_v4()), Err(Error::NotFound(_))));
    }
}
