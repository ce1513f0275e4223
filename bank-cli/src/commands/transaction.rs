//! Money movement commands - deposit, withdraw, transfer and tx show

use anyhow::Result;
use bank_core::services::{
    CreateTransactionRequest, LogEvent, TransactionResponse, TransactionService,
};
use bank_core::{Money, OperationResult, TransactionKind, TransactionStatus};
use clap::Subcommand;
use uuid::Uuid;

use super::{get_context, get_logger, log_event, print_json};
use crate::output::{self, transaction_table};

#[derive(Subcommand)]
pub enum TxCommands {
    /// Show a transaction by id
    Show {
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Submit one transaction and report its outcome
pub fn submit(
    kind: TransactionKind,
    source_account_id: Option<Uuid>,
    destination_account_id: Option<Uuid>,
    amount: Money,
    id: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    let request = CreateTransactionRequest {
        id,
        kind,
        source_account_id,
        destination_account_id,
        amount,
    };
    let command = kind.as_str().to_lowercase();
    let response = match ctx.transactions.create_transaction(request) {
        Ok(response) => response,
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("transaction_failed")
                    .with_command(command)
                    .with_error(e.to_string()),
            );
            if json {
                let envelope = OperationResult::from(Err::<TransactionResponse, _>(e));
                print_json(&envelope)?;
                std::process::exit(1);
            }
            return Err(e.into());
        }
    };

    log_event(
        &logger,
        LogEvent::new(format!("transaction_{}", response.status.as_str().to_lowercase()))
            .with_command(command)
            .with_transaction(response.id.clone()),
    );

    report(&response, json)
}

fn report(response: &TransactionResponse, json: bool) -> Result<()> {
    if json {
        return print_json(response);
    }
    match response.status {
        TransactionStatus::Applied => output::success(&format!("Transaction {} applied", response.id)),
        TransactionStatus::Rejected => output::warning(&format!(
            "Transaction {} rejected: {}",
            response.id,
            response.rejection_reason.map(|r| r.as_str()).unwrap_or("unknown")
        )),
        TransactionStatus::Pending => output::warning(&format!(
            "Transaction {} is still pending; resubmit it with --id to finish",
            response.id
        )),
    }
    println!("{}", transaction_table(response));
    Ok(())
}

pub fn run(command: TxCommands) -> Result<()> {
    let ctx = get_context()?;
    match command {
        TxCommands::Show { id, json } => {
            let response = ctx.transactions.get_transaction(&id)?;
            if json {
                return print_json(&response);
            }
            println!("{}", transaction_table(&response));
        }
    }
    Ok(())
}
