//! DuckDB ledger store implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use duckdb::types::Type;
use duckdb::{params, Connection, Row};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Account, Customer, Money, RejectionReason, Transaction, TransactionKind, TransactionStatus,
};
use crate::migrations::MIGRATIONS;
use crate::ports::{
    AccountStore, CommitOutcome, CustomerDirectory, LedgerCommit, LedgerStore, TransactionLog,
};
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

const ACCOUNT_COLUMNS: &str =
    "account_id, customer_id, currency, balance, version, closed_at, created_at, updated_at";

const TRANSACTION_COLUMNS: &str = "transaction_id, kind, source_account_id, destination_account_id, \
     amount, status, request_hash, rejection_reason, created_at, applied_at";

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

/// DuckDB-backed ledger store
///
/// A single connection sits behind a mutex; the lock is held for one
/// statement (or one commit) at a time, never across engine logic.
pub struct DuckDbLedgerStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbLedgerStore {
    /// Open (or create) a ledger database file
    ///
    /// Retries with exponential backoff on file locking errors, which happen
    /// when another process holds the database open.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        tracing::warn!(
                            delay_ms = delay.as_millis() as u64,
                            attempt = attempt + 1,
                            max = MAX_RETRIES,
                            error = %err_msg,
                            "database busy, retrying"
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error.map(Error::from).unwrap_or_else(|| {
            Error::storage(format!("failed to open database after {} retries", MAX_RETRIES))
        }))
    }

    /// Open a throwaway in-memory ledger database
    pub fn open_in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory_with_flags(config)?),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> duckdb::Result<Connection> {
        // Extension autoloading stays off; nothing in the ledger needs it
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Connection::open_with_flags(db_path, config)
    }

    /// Run database migrations
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn, MIGRATIONS).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        let result = self.run_migrations()?;
        if !result.applied.is_empty() {
            tracing::info!(applied = ?result.applied, "ledger schema migrated");
        }
        Ok(())
    }

    /// Path of the backing file, if any
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::storage(format!("connection lock poisoned: {}", e)))
    }

    fn query_accounts(
        conn: &Connection,
        sql: &str,
        params: &[&dyn duckdb::ToSql],
    ) -> Result<Vec<Account>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, row_to_account)?;
        let mut accounts = Vec::new();
        for account in rows {
            accounts.push(account?);
        }
        Ok(accounts)
    }

    fn query_transactions(
        conn: &Connection,
        sql: &str,
        params: &[&dyn duckdb::ToSql],
    ) -> Result<Vec<Transaction>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, row_to_transaction)?;
        let mut txs = Vec::new();
        for tx in rows {
            txs.push(tx?);
        }
        Ok(txs)
    }
}

impl AccountStore for DuckDbLedgerStore {
    fn get(&self, id: Uuid) -> Result<Option<Account>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM sys_accounts WHERE account_id = ?", ACCOUNT_COLUMNS);
        Ok(Self::query_accounts(&conn, &sql, params![id.to_string()])?
            .into_iter()
            .next())
    }

    fn list(&self) -> Result<Vec<Account>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM sys_accounts ORDER BY created_at, account_id",
            ACCOUNT_COLUMNS
        );
        Self::query_accounts(&conn, &sql, params![])
    }

    fn insert(&self, account: &Account) -> Result<()> {
        account.validate().map_err(Error::validation)?;
        let conn = self.lock()?;

        let existing: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sys_accounts WHERE account_id = ?",
            params![account.id.to_string()],
            |row| row.get(0),
        )?;
        if existing > 0 {
            return Err(Error::validation(format!("account {} already exists", account.id)));
        }

        conn.execute(
            "INSERT INTO sys_accounts (account_id, customer_id, currency, balance, version,
                                       closed_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                account.id.to_string(),
                account.customer_id.to_string(),
                account.currency,
                account.balance.minor(),
                account.version,
                account.closed_at.map(format_timestamp),
                format_timestamp(account.created_at),
                format_timestamp(account.updated_at),
            ],
        )?;
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
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE sys_accounts SET balance = ?, version = version + 1, updated_at = ?
             WHERE account_id = ? AND version = ?",
            params![
                new_balance.minor(),
                format_timestamp(Utc::now()),
                id.to_string(),
                expected_version,
            ],
        )?;
        Ok(changed == 1)
    }

    fn close(&self, id: Uuid, expected_version: i64, closed_at: DateTime<Utc>) -> Result<bool> {
        let conn = self.lock()?;
        let stamp = format_timestamp(closed_at);
        let changed = conn.execute(
            "UPDATE sys_accounts SET closed_at = ?, version = version + 1, updated_at = ?
             WHERE account_id = ? AND version = ? AND balance = 0 AND closed_at IS NULL",
            params![stamp, stamp, id.to_string(), expected_version],
        )?;
        Ok(changed == 1)
    }
}

impl TransactionLog for DuckDbLedgerStore {
    fn find(&self, id: &str) -> Result<Option<Transaction>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM sys_transactions WHERE transaction_id = ?",
            TRANSACTION_COLUMNS
        );
        Ok(Self::query_transactions(&conn, &sql, params![id])?.into_iter().next())
    }

    fn insert_if_absent(&self, tx: &Transaction) -> Result<bool> {
        let conn = self.lock()?;
        // ON CONFLICT DO NOTHING keeps the first writer's record intact
        let rows_changed = conn.execute(
            "INSERT INTO sys_transactions (transaction_id, kind, source_account_id,
                                           destination_account_id, amount, status, request_hash,
                                           rejection_reason, created_at, applied_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (transaction_id) DO NOTHING",
            params![
                tx.id,
                tx.kind.as_str(),
                tx.source_account_id.map(|id| id.to_string()),
                tx.destination_account_id.map(|id| id.to_string()),
                tx.amount.minor(),
                tx.status.as_str(),
                tx.request_hash,
                tx.rejection_reason.map(|r| r.as_str()),
                format_timestamp(tx.created_at),
                tx.applied_at.map(format_timestamp),
            ],
        )?;
        Ok(rows_changed > 0)
    }

    fn mark_applied(&self, id: &str, applied_at: DateTime<Utc>) -> Result<bool> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE sys_transactions SET status = 'APPLIED', applied_at = ?
             WHERE transaction_id = ? AND status = 'PENDING'",
            params![format_timestamp(applied_at), id],
        )?;
        Ok(changed == 1)
    }

    fn mark_rejected(&self, id: &str, reason: RejectionReason) -> Result<bool> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE sys_transactions SET status = 'REJECTED', rejection_reason = ?
             WHERE transaction_id = ? AND status = 'PENDING'",
            params![reason.as_str(), id],
        )?;
        Ok(changed == 1)
    }

    fn list_for_account(&self, account_id: Uuid) -> Result<Vec<Transaction>> {
        let conn = self.lock()?;
        let id = account_id.to_string();
        let sql = format!(
            "SELECT {} FROM sys_transactions
             WHERE source_account_id = ? OR destination_account_id = ?
             ORDER BY created_at, transaction_id",
            TRANSACTION_COLUMNS
        );
        Self::query_transactions(&conn, &sql, params![id, id])
    }

    fn list_pending(&self) -> Result<Vec<Transaction>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM sys_transactions WHERE status = 'PENDING'
             ORDER BY created_at, transaction_id",
            TRANSACTION_COLUMNS
        );
        Self::query_transactions(&conn, &sql, params![])
    }

    fn count_by_status(&self) -> Result<Vec<(TransactionStatus, i64)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT status, COUNT(*) FROM sys_transactions GROUP BY status ORDER BY status",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = Vec::new();
        for row in rows {
            let (status, count) = row?;
            counts.push((status.parse::<TransactionStatus>()?, count));
        }
        Ok(counts)
    }
}

impl LedgerStore for DuckDbLedgerStore {
    fn commit(&self, commit: &LedgerCommit<'_>) -> Result<CommitOutcome> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let stamp = format_timestamp(commit.applied_at);

        let finalized = tx.execute(
            "UPDATE sys_transactions SET status = 'APPLIED', applied_at = ?
             WHERE transaction_id = ? AND status = 'PENDING'",
            params![stamp, commit.transaction_id],
        )?;
        if finalized != 1 {
            tx.rollback()?;
            return Ok(CommitOutcome::AlreadyFinal);
        }

        for update in &commit.updates {
            let changed = tx.execute(
                "UPDATE sys_accounts SET balance = ?, version = version + 1, updated_at = ?
                 WHERE account_id = ? AND version = ?",
                params![
                    update.new_balance.minor(),
                    stamp,
                    update.account_id.to_string(),
                    update.expected_version,
                ],
            )?;
            if changed != 1 {
                tx.rollback()?;
                return Ok(CommitOutcome::VersionConflict);
            }
        }

        tx.commit()?;
        Ok(CommitOutcome::Committed)
    }
}

impl CustomerDirectory for DuckDbLedgerStore {
    fn customer_exists(&self, id: Uuid) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sys_customers WHERE customer_id = ?",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn get_customer(&self, id: Uuid) -> Result<Option<Customer>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT customer_id, name, email, created_at FROM sys_customers WHERE customer_id = ?",
        )?;
        let mut rows = stmt.query_map(params![id.to_string()], |row| {
            Ok(Customer {
                id: uuid_at(row, 0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                created_at: timestamp_at(row, 3)?,
            })
        })?;
        Ok(rows.next().transpose()?)
    }

    fn add_customer(&self, customer: &Customer) -> Result<()> {
        customer.validate().map_err(Error::validation)?;
        let conn = self.lock()?;
        let rows_changed = conn.execute(
            "INSERT INTO sys_customers (customer_id, name, email, created_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (customer_id) DO NOTHING",
            params![
                customer.id.to_string(),
                customer.name,
                customer.email,
                format_timestamp(customer.created_at),
            ],
        )?;
        if rows_changed == 0 {
            return Err(Error::validation(format!("customer {} already exists", customer.id)));
        }
        Ok(())
    }

    fn count_customers(&self) -> Result<i64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM sys_customers", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn row_to_account(row: &Row) -> duckdb::Result<Account> {
    Ok(Account {
        id: uuid_at(row, 0)?,
        customer_id: uuid_at(row, 1)?,
        currency: row.get(2)?,
        balance: Money::from_minor(row.get(3)?),
        version: row.get(4)?,
        closed_at: optional_timestamp_at(row, 5)?,
        created_at: timestamp_at(row, 6)?,
        updated_at: timestamp_at(row, 7)?,
    })
}

fn row_to_transaction(row: &Row) -> duckdb::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        kind: parsed_at::<TransactionKind>(row, 1)?,
        source_account_id: optional_uuid_at(row, 2)?,
        destination_account_id: optional_uuid_at(row, 3)?,
        amount: Money::from_minor(row.get(4)?),
        status: parsed_at::<TransactionStatus>(row, 5)?,
        request_hash: row.get(6)?,
        rejection_reason: match row.get::<_, Option<String>>(7)? {
            Some(text) => Some(text.parse::<RejectionReason>().map_err(|e| conversion(7, e))?),
            None => None,
        },
        created_at: timestamp_at(row, 8)?,
        applied_at: optional_timestamp_at(row, 9)?,
    })
}

// Helper functions

fn conversion<E>(idx: usize, err: E) -> duckdb::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    duckdb::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn uuid_at(row: &Row, idx: usize) -> duckdb::Result<Uuid> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text).map_err(|e| conversion(idx, e))
}

fn optional_uuid_at(row: &Row, idx: usize) -> duckdb::Result<Option<Uuid>> {
    row.get::<_, Option<String>>(idx)?
        .map(|text| Uuid::parse_str(&text).map_err(|e| conversion(idx, e)))
        .transpose()
}

fn parsed_at<T>(row: &Row, idx: usize) -> duckdb::Result<T>
where
    T: std::str::FromStr<Err = Error>,
{
    let text: String = row.get(idx)?;
    text.parse::<T>().map_err(|e| conversion(idx, e))
}

fn timestamp_at(row: &Row, idx: usize) -> duckdb::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    parse_timestamp(&text).map_err(|e| conversion(idx, e))
}

fn optional_timestamp_at(row: &Row, idx: usize) -> duckdb::Result<Option<DateTime<Utc>>> {
    row.get::<_, Option<String>>(idx)?
        .map(|text| parse_timestamp(&text).map_err(|e| conversion(idx, e)))
        .transpose()
}

/// Fixed-width RFC 3339 so stored timestamps order correctly as text
fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransactionRequest;
    use crate::ports::BalanceUpdate;

    fn store() -> DuckDbLedgerStore {
        let store = DuckDbLedgerStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        store
    }

    fn seeded_account(store: &DuckDbLedgerStore, minor: i64) -> Account {
        let mut account = Account::new(Uuid::new_v4(), Uuid::new_v4(), "USD");
        account.balance = Money::from_minor(minor);
        store.insert(&account).unwrap();
        account
    }

    #[test]
    fn test_retryable_error_detection() {
        assert!(is_retryable_error(
            "The process cannot access the file because it is being used by another process"
        ));
        assert!(is_retryable_error("IO Error: database is locked"));
        assert!(!is_retryable_error("Permission denied"));
        assert!(!is_retryable_error("Catalog Error: table not found"));
    }

    #[test]
    fn test_timestamp_format_is_fixed_width_and_round_trips() {
        let now = Utc::now();
        let text = format_timestamp(now);
        assert!(text.ends_with('Z'));
        assert_eq!(text.len(), "2024-01-01T00:00:00.000000Z".len());
        let parsed = parse_timestamp(&text).unwrap();
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn test_account_round_trip() {
        let store = store();
        let account = seeded_account(&store, 1000);

        let loaded = store.get(account.id).unwrap().unwrap();
        assert_eq!(loaded.id, account.id);
        assert_eq!(loaded.customer_id, account.customer_id);
        assert_eq!(loaded.balance, Money::from_minor(1000));
        assert_eq!(loaded.version, 0);
        assert!(store.get(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_account_insert_is_rejected() {
        let store = store();
        let account = seeded_account(&store, 0);
        let err = store.insert(&account).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_compare_and_swap_requires_current_version() {
        let store = store();
        let account = seeded_account(&store, 1000);

        assert!(store.compare_and_swap(account.id, 0, Money::from_minor(700)).unwrap());
        // second writer read version 0 too and must lose
        assert!(!store.compare_and_swap(account.id, 0, Money::from_minor(900)).unwrap());

        let loaded = store.get(account.id).unwrap().unwrap();
        assert_eq!(loaded.balance, Money::from_minor(700));
        assert_eq!(loaded.version, 1);
    }

    #[test]
    fn test_compare_and_swap_refuses_negative_balance() {
        let store = store();
        let account = seeded_account(&store, 10);
        assert!(store.compare_and_swap(account.id, 0, Money::from_minor(-1)).is_err());
    }

    #[test]
    fn test_close_requires_zero_balance() {
        let store = store();
        let funded = seeded_account(&store, 10);
        assert!(!store.close(funded.id, 0, Utc::now()).unwrap());

        let empty = seeded_account(&store, 0);
        assert!(store.close(empty.id, 0, Utc::now()).unwrap());
        let loaded = store.get(empty.id).unwrap().unwrap();
        assert!(loaded.is_closed());
        assert_eq!(loaded.version, 1);
    }

    #[test]
    fn test_insert_if_absent_keeps_first_record() {
        let store = store();
        let a = Uuid::new_v4();
        let first = Transaction::pending(&TransactionRequest::deposit("T1", a, Money::from_minor(5)));
        let second = Transaction::pending(&TransactionRequest::deposit("T1", a, Money::from_minor(9)));

        assert!(store.insert_if_absent(&first).unwrap());
        assert!(!store.insert_if_absent(&second).unwrap());
        assert_eq!(store.find("T1").unwrap().unwrap().amount, Money::from_minor(5));
    }

    #[test]
    fn test_status_transitions_happen_once() {
        let store = store();
        let tx = Transaction::pending(&TransactionRequest::withdrawal(
            "T2",
            Uuid::new_v4(),
            Money::from_minor(5),
        ));
        store.insert_if_absent(&tx).unwrap();

        assert!(store.mark_rejected("T2", RejectionReason::InsufficientFunds).unwrap());
        assert!(!store.mark_applied("T2", Utc::now()).unwrap());

        let loaded = store.find("T2").unwrap().unwrap();
        assert_eq!(loaded.status, TransactionStatus::Rejected);
        assert_eq!(loaded.rejection_reason, Some(RejectionReason::InsufficientFunds));
        assert!(loaded.applied_at.is_none());
    }

    #[test]
    fn test_commit_is_all_or_nothing() {
        let store = store();
        let a = seeded_account(&store, 1000);
        let b = seeded_account(&store, 500);
        let tx = Transaction::pending(&TransactionRequest::transfer(
            "T1",
            a.id,
            b.id,
            Money::from_minor(300),
        ));
        store.insert_if_absent(&tx).unwrap();

        // b moves underneath us
        assert!(store.compare_and_swap(b.id, 0, Money::from_minor(600)).unwrap());

        let mut updates = vec![
            BalanceUpdate { account_id: a.id, expected_version: 0, new_balance: Money::from_minor(700) },
            BalanceUpdate { account_id: b.id, expected_version: 0, new_balance: Money::from_minor(800) },
        ];
        updates.sort_by_key(|u| u.account_id);
        let outcome = store
            .commit(&LedgerCommit { transaction_id: "T1", applied_at: Utc::now(), updates })
            .unwrap();
        assert_eq!(outcome, CommitOutcome::VersionConflict);

        // nothing from the failed commit is visible
        assert_eq!(store.get(a.id).unwrap().unwrap().balance, Money::from_minor(1000));
        assert_eq!(store.get(a.id).unwrap().unwrap().version, 0);
        assert_eq!(store.find("T1").unwrap().unwrap().status, TransactionStatus::Pending);
    }

    #[test]
    fn test_commit_after_finalization_reports_already_final() {
        let store = store();
        let a = seeded_account(&store, 0);
        let tx = Transaction::pending(&TransactionRequest::deposit("D1", a.id, Money::from_minor(50)));
        store.insert_if_absent(&tx).unwrap();
        store.mark_rejected("D1", RejectionReason::AccountClosed).unwrap();

        let outcome = store
            .commit(&LedgerCommit {
                transaction_id: "D1",
                applied_at: Utc::now(),
                updates: vec![BalanceUpdate {
                    account_id: a.id,
                    expected_version: 0,
                    new_balance: Money::from_minor(50),
                }],
            })
            .unwrap();
        assert_eq!(outcome, CommitOutcome::AlreadyFinal);
        assert_eq!(store.get(a.id).unwrap().unwrap().balance, Money::ZERO);
    }

    #[test]
    fn test_customer_directory() {
        let store = store();
        let customer = Customer::new(Uuid::new_v4(), "Sipho");
        assert!(!store.customer_exists(customer.id).unwrap());

        store.add_customer(&customer).unwrap();
        assert!(store.customer_exists(customer.id).unwrap());
        assert_eq!(store.get_customer(customer.id).unwrap().unwrap().name, "Sipho");
        assert_eq!(store.count_customers().unwrap(), 1);
        assert!(store.add_customer(&customer).is_err());
    }
}
