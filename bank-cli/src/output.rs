//! Output formatting utilities

use bank_core::services::{AccountResponse, TransactionResponse};
use bank_core::TransactionStatus;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn status_cell(status: TransactionStatus) -> Cell {
    match status {
        TransactionStatus::Applied => Cell::new("APPLIED").fg(Color::Green),
        TransactionStatus::Rejected => Cell::new("REJECTED").fg(Color::Red),
        TransactionStatus::Pending => Cell::new("PENDING").fg(Color::Yellow),
    }
}

/// Key/value table for one transaction
pub fn transaction_table(tx: &TransactionResponse) -> Table {
    let mut table = create_table();
    table.add_row(vec![Cell::new("Id"), Cell::new(&tx.id)]);
    table.add_row(vec![Cell::new("Kind"), Cell::new(tx.kind.as_str())]);
    table.add_row(vec![Cell::new("Status"), status_cell(tx.status)]);
    table.add_row(vec![Cell::new("Amount"), Cell::new(tx.amount.to_string())]);
    if let Some(source) = tx.source_account_id {
        table.add_row(vec![Cell::new("From"), Cell::new(source.to_string())]);
    }
    if let Some(destination) = tx.destination_account_id {
        table.add_row(vec![Cell::new("To"), Cell::new(destination.to_string())]);
    }
    if let Some(applied_at) = tx.applied_at {
        table.add_row(vec![
            Cell::new("Applied"),
            Cell::new(applied_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        ]);
    }
    if let Some(reason) = tx.rejection_reason {
        table.add_row(vec![Cell::new("Reason"), Cell::new(reason.as_str()).fg(Color::Red)]);
    }
    table
}

/// One row per account
pub fn accounts_table(accounts: &[AccountResponse]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Id", "Customer", "Currency", "Balance", "Version", "State"]);
    for account in accounts {
        let state = if account.closed_at.is_some() {
            Cell::new("closed").fg(Color::DarkGrey)
        } else {
            Cell::new("open").fg(Color::Green)
        };
        table.add_row(vec![
            Cell::new(account.id.to_string()),
            Cell::new(account.customer_id.to_string()),
            Cell::new(&account.currency),
            Cell::new(account.balance.to_string()),
            Cell::new(account.version.to_string()),
            state,
        ]);
    }
    table
}
