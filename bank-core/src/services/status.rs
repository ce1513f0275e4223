//! Status service - ledger summary

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, Money};
use crate::ports::{AccountStore, CustomerDirectory, LedgerStore, TransactionLog};
use crate::services::total_balance;

/// Status service for ledger summaries
pub struct StatusService {
    store: Arc<dyn LedgerStore>,
    customers: Arc<dyn CustomerDirectory>,
}

impl StatusService {
    pub fn new(store: Arc<dyn LedgerStore>, customers: Arc<dyn CustomerDirectory>) -> Self {
        Self { store, customers }
    }

    /// Get overall status summary
    pub fn get_status(&self) -> Result<StatusSummary> {
        let accounts = self.store.list()?;

        let mut by_currency: BTreeMap<&str, Vec<Account>> = BTreeMap::new();
        for account in &accounts {
            by_currency.entry(&account.currency).or_default().push(account.clone());
        }
        let mut holdings = Vec::with_capacity(by_currency.len());
        for (currency, group) in by_currency {
            let total = total_balance(&group)
                .ok_or_else(|| Error::storage(format!("{} holdings overflow", currency)))?;
            holdings.push(CurrencyHolding {
                currency: currency.to_string(),
                total,
            });
        }

        let mut transactions = BTreeMap::new();
        for (status, count) in self.store.count_by_status()? {
            transactions.insert(status.to_string(), count);
        }

        Ok(StatusSummary {
            total_customers: self.customers.count_customers()?,
            total_accounts: accounts.len() as i64,
            closed_accounts: accounts.iter().filter(|a| a.is_closed()).count() as i64,
            total_transactions: transactions.values().sum(),
            transactions,
            holdings,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub total_customers: i64,
    pub total_accounts: i64,
    pub closed_accounts: i64,
    pub total_transactions: i64,
    /// Count per status (PENDING / APPLIED / REJECTED)
    pub transactions: BTreeMap<String, i64>,
    pub holdings: Vec<CurrencyHolding>,
}

#[derive(Debug, Serialize)]
pub struct CurrencyHolding {
    pub currency: String,
    pub total: Money,
}
