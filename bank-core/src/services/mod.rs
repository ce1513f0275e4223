//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod account;
mod doctor;
mod ledger;
pub mod logging;
pub mod migration;
mod statement;
mod status;
mod transaction;

pub use account::{
    opening_deposit_id, AccountResponse, AccountService, LedgerAccountService, OpenAccountRequest,
    DEFAULT_CURRENCY,
};
pub use doctor::{CheckResult, DoctorResult, DoctorService, DoctorSummary};
pub use ledger::{total_balance, LedgerEngine};
pub use logging::{EntryPoint, LogEntry, LogEvent, LogStats, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use statement::{Statement, StatementLine, StatementService};
pub use status::{CurrencyHolding, StatusService, StatusSummary};
pub use transaction::{
    CreateTransactionRequest, LedgerTransactionService, TransactionResponse, TransactionService,
};
