//! Bank Core - account ledger and transaction processing
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (Account, Transaction, Money, etc.)
//! - **ports**: Trait definitions for external dependencies (LedgerStore, PaymentClient)
//! - **services**: Business logic orchestration (LedgerEngine and façades)
//! - **adapters**: Concrete implementations (DuckDB, in-memory, HTTP)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::duckdb::DuckDbLedgerStore;
use adapters::payments::HttpPaymentClient;
use config::Config;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{
    Account, Customer, Money, RejectionReason, Transaction, TransactionKind, TransactionRequest,
    TransactionStatus,
};

pub const LEDGER_DB_FILE: &str = "bank.duckdb";

/// Main context for bank operations
///
/// Holds the ledger store, configuration, and every service built on them.
pub struct BankContext {
    pub config: Config,
    pub store: Arc<DuckDbLedgerStore>,
    pub engine: Arc<LedgerEngine>,
    pub accounts: LedgerAccountService,
    pub transactions: LedgerTransactionService,
    pub status_service: StatusService,
    pub doctor_service: DoctorService,
    pub statement_service: StatementService,
    pub payments: HttpPaymentClient,
}

impl BankContext {
    /// Open the bank in `bank_dir`, creating the ledger database if needed
    pub fn new(bank_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(bank_dir)
            .with_context(|| format!("failed to create {}", bank_dir.display()))?;
        let config = Config::load(bank_dir)?;

        let store = Arc::new(DuckDbLedgerStore::new(&bank_dir.join(LEDGER_DB_FILE))?);
        store.ensure_schema()?;

        Self::with_store(config, store)
    }

    /// Build the services over an already-opened store
    pub fn with_store(config: Config, store: Arc<DuckDbLedgerStore>) -> Result<Self> {
        let engine = Arc::new(LedgerEngine::new(store.clone(), config.ledger.clone())?);
        let payments = HttpPaymentClient::new(&config.payments)?;

        Ok(Self {
            accounts: LedgerAccountService::new(engine.clone(), store.clone()),
            transactions: LedgerTransactionService::new(engine.clone()),
            status_service: StatusService::new(store.clone(), store.clone()),
            doctor_service: DoctorService::new(store.clone(), config.ledger.stale_pending_secs),
            statement_service: StatementService::new(store.clone()),
            payments,
            engine,
            store,
            config,
        })
    }
}
