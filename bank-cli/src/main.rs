//! Bank CLI - account ledger in your terminal

use std::process::ExitCode;

use anyhow::Result;
use bank_core::{Money, TransactionKind};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod commands;
mod output;

use commands::{account, customer, doctor, logs, payment, status, transaction};

/// Bank - account ledger and money movement in your terminal
#[derive(Parser)]
#[command(name = "bank", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show ledger status and summary
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage customers
    Customer {
        #[command(subcommand)]
        command: customer::CustomerCommands,
    },

    /// Manage accounts
    Account {
        #[command(subcommand)]
        command: account::AccountCommands,
    },

    /// Deposit money into an account
    Deposit {
        /// Destination account id
        account: Uuid,
        /// Amount, e.g. 10.00
        amount: Money,
        /// Idempotency token; generated when omitted
        #[arg(long)]
        id: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Withdraw money from an account
    Withdraw {
        /// Source account id
        account: Uuid,
        /// Amount, e.g. 10.00
        amount: Money,
        /// Idempotency token; generated when omitted
        #[arg(long)]
        id: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move money between two accounts
    Transfer {
        /// Source account id
        from: Uuid,
        /// Destination account id
        to: Uuid,
        /// Amount, e.g. 10.00
        amount: Money,
        /// Idempotency token; generated when omitted
        #[arg(long)]
        id: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect transactions
    Tx {
        #[command(subcommand)]
        command: transaction::TxCommands,
    },

    /// Submit and track outbound payments
    Payment {
        #[command(subcommand)]
        command: payment::PaymentCommands,
    },

    /// Run ledger health checks
    Doctor {
        /// Show verbose output
        #[arg(long, short)]
        verbose: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Status { json } => status::run(json),
        Commands::Customer { command } => customer::run(command),
        Commands::Account { command } => account::run(command),
        Commands::Deposit { account, amount, id, json } => {
            transaction::submit(TransactionKind::Deposit, None, Some(account), amount, id, json)
        }
        Commands::Withdraw { account, amount, id, json } => {
            transaction::submit(TransactionKind::Withdrawal, Some(account), None, amount, id, json)
        }
        Commands::Transfer { from, to, amount, id, json } => {
            transaction::submit(TransactionKind::Transfer, Some(from), Some(to), amount, id, json)
        }
        Commands::Tx { command } => transaction::run(command),
        Commands::Payment { command } => payment::run(command),
        Commands::Doctor { verbose, json } => doctor::run(verbose, json),
        Commands::Logs { command } => logs::run(command),
    }
}
