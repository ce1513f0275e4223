//! CLI command implementations

pub mod account;
pub mod customer;
pub mod doctor;
pub mod logs;
pub mod payment;
pub mod status;
pub mod transaction;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use bank_core::services::{EntryPoint, LogEvent, LoggingService};
use bank_core::BankContext;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let bank_dir = get_bank_dir().ok()?;
    std::fs::create_dir_all(&bank_dir).ok()?;
    LoggingService::new(&bank_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        if let Err(e) = l.log(event) {
            tracing::debug!(error = %e, "failed to write event log");
        }
    }
}

/// Get the bank directory from BANK_DIR or default to ~/.bank
pub fn get_bank_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("BANK_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".bank"))
        .ok_or_else(|| anyhow!("Could not find home directory; set BANK_DIR"))
}

/// Open the bank context
pub fn get_context() -> Result<BankContext> {
    let bank_dir = get_bank_dir()?;
    BankContext::new(&bank_dir)
        .with_context(|| format!("Failed to open bank in {}", bank_dir.display()))
}

/// Print a value as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
