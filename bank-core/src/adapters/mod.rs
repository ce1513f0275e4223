//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the LedgerStore and CustomerDirectory ports
//! - In-memory maps for the same ports (tests, embedding)
//! - Blocking HTTP client for the PaymentClient port

pub mod duckdb;
pub mod memory;
pub mod payments;

#[cfg(test)]
pub mod payments_mock;
