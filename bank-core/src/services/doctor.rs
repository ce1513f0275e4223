//! Doctor service - ledger health checks

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::json;

use crate::domain::result::{Error, Result};
use crate::domain::Money;
use crate::ports::{AccountStore, LedgerStore, TransactionLog};

/// Doctor service for health checks
pub struct DoctorService {
    store: Arc<dyn LedgerStore>,
    stale_pending_secs: u64,
}

impl DoctorService {
    pub fn new(store: Arc<dyn LedgerStore>, stale_pending_secs: u64) -> Self {
        Self { store, stale_pending_secs }
    }

    /// Run all health checks
    pub fn run_checks(&self) -> Result<DoctorResult> {
        let mut checks = HashMap::new();
        let accounts = self.store.list()?;

        // Negative balances
        let negative: Vec<serde_json::Value> = accounts
            .iter()
            .filter(|a| a.balance.is_negative())
            .map(|a| json!({"account_id": a.id, "balance": a.balance.to_string()}))
            .collect();
        checks.insert("negative_balances".to_string(), CheckResult::from_findings(
            "error",
            "No account has a negative balance",
            format!("{} account(s) have a negative balance", negative.len()),
            negative,
        ));

        // Every balance must equal the net of its APPLIED transactions
        let mut drift = Vec::new();
        for account in &accounts {
            let mut expected = Money::ZERO;
            let mut overflowed = false;
            for tx in self.store.list_for_account(account.id)? {
                match expected.checked_add(tx.net_effect_on(account.id)) {
                    Some(sum) => expected = sum,
                    None => overflowed = true,
                }
            }
            if overflowed || expected != account.balance {
                drift.push(json!({
                    "account_id": account.id,
                    "balance": account.balance.to_string(),
                    "ledger_net": if overflowed { "overflow".to_string() } else { expected.to_string() },
                }));
            }
        }
        checks.insert("balance_reconciliation".to_string(), CheckResult::from_findings(
            "error",
            "Every balance matches its applied transactions",
            format!("{} account(s) disagree with the transaction log", drift.len()),
            drift,
        ));

        // PENDING records nobody is finishing
        let cutoff = i64::try_from(self.stale_pending_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .ok_or_else(|| {
                Error::Config(format!(
                    "stale pending threshold of {}s is out of range",
                    self.stale_pending_secs
                ))
            })?;
        let stale: Vec<serde_json::Value> = self
            .store
            .list_pending()?
            .into_iter()
            .filter(|tx| tx.created_at < cutoff)
            .map(|tx| json!({"transaction_id": tx.id, "created_at": tx.created_at.to_rfc3339()}))
            .collect();
        checks.insert("stale_pending".to_string(), CheckResult::from_findings(
            "warning",
            "No transaction is stuck in PENDING",
            format!(
                "{} transaction(s) PENDING for more than {}s; resubmit them to finish",
                stale.len(),
                self.stale_pending_secs
            ),
            stale,
        ));

        // Calculate summary
        let passed = checks.values().filter(|c| c.status == "pass").count() as i64;
        let warnings = checks.values().filter(|c| c.status == "warning").count() as i64;
        let errors = checks.values().filter(|c| c.status == "error").count() as i64;

        Ok(DoctorResult {
            checks,
            summary: DoctorSummary { passed, warnings, errors },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorResult {
    pub checks: HashMap<String, CheckResult>,
    pub summary: DoctorSummary,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<serde_json::Value>>,
}

impl CheckResult {
    fn from_findings(
        failing_status: &str,
        pass_message: &str,
        fail_message: String,
        findings: Vec<serde_json::Value>,
    ) -> Self {
        if findings.is_empty() {
            Self {
                status: "pass".to_string(),
                message: pass_message.to_string(),
                details: None,
            }
        } else {
            Self {
                status: failing_status.to_string(),
                message: fail_message,
                details: Some(findings),
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub passed: i64,
    pub warnings: i64,
    pub errors: i64,
}
