//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod ledger;
mod payments;

pub use ledger::{
    AccountStore, BalanceUpdate, CommitOutcome, CustomerDirectory, LedgerCommit, LedgerStore,
    TransactionLog,
};
pub use payments::{PaymentClient, PaymentInstruction, PaymentReceipt, PaymentStatus};
