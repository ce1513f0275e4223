//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod account;
mod customer;
pub mod money;
pub mod result;
mod transaction;

pub use account::Account;
pub use customer::Customer;
pub use money::Money;
pub use transaction::{
    RejectionReason, Transaction, TransactionKind, TransactionRequest, TransactionStatus,
};
