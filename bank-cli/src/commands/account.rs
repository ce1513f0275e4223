//! Account command - open, inspect, close and export accounts

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bank_core::services::{AccountService, LogEvent, OpenAccountRequest};
use bank_core::Money;
use clap::Subcommand;
use colored::Colorize;
use comfy_table::Cell;
use uuid::Uuid;

use super::{get_context, get_logger, log_event, print_json};
use crate::output::{self, accounts_table, create_table};

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Open an account for an existing customer
    Open {
        /// Owning customer id
        #[arg(long)]
        customer: Uuid,
        /// ISO currency code
        #[arg(long)]
        currency: Option<String>,
        /// Opening deposit, e.g. 25.00
        #[arg(long)]
        deposit: Option<Money>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one account
    Show {
        id: Uuid,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all accounts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Close a zero-balance account
    Close {
        id: Uuid,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export an account statement as CSV
    Statement {
        id: Uuid,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output as JSON instead of CSV
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: AccountCommands) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    match command {
        AccountCommands::Open {
            customer,
            currency,
            deposit,
            json,
        } => {
            let account = ctx.accounts.open_account(OpenAccountRequest {
                customer_id: customer,
                currency,
                opening_deposit: deposit,
            })?;
            log_event(
                &logger,
                LogEvent::new("account_opened").with_command("account open"),
            );

            if json {
                return print_json(&account);
            }
            output::success(&format!(
                "Opened {} account {} with balance {}",
                account.currency, account.id, account.balance
            ));
        }
        AccountCommands::Show { id, json } => {
            let account = ctx.accounts.get_account(id)?;
            if json {
                return print_json(&account);
            }
            let mut table = create_table();
            table.add_row(vec![Cell::new("Id"), Cell::new(account.id.to_string())]);
            table.add_row(vec![Cell::new("Customer"), Cell::new(account.customer_id.to_string())]);
            table.add_row(vec![Cell::new("Currency"), Cell::new(&account.currency)]);
            table.add_row(vec![Cell::new("Balance"), Cell::new(account.balance.to_string())]);
            table.add_row(vec![Cell::new("Version"), Cell::new(account.version.to_string())]);
            table.add_row(vec![
                Cell::new("Opened"),
                Cell::new(account.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            ]);
            if let Some(closed_at) = account.closed_at {
                table.add_row(vec![
                    Cell::new("Closed"),
                    Cell::new(closed_at.format("%Y-%m-%d %H:%M:%S").to_string()),
                ]);
            }
            println!("{}", table);
        }
        AccountCommands::List { json } => {
            let accounts = ctx.accounts.list_accounts()?;
            if json {
                return print_json(&accounts);
            }
            if accounts.is_empty() {
                println!("No accounts found.");
                return Ok(());
            }
            println!("{}", accounts_table(&accounts));
        }
        AccountCommands::Close { id, force, json } => {
            if !force && !json {
                use dialoguer::Confirm;
                if !Confirm::new()
                    .with_prompt(format!("Close account {}?", id))
                    .default(false)
                    .interact()?
                {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let account = ctx.accounts.close_account(id)?;
            log_event(
                &logger,
                LogEvent::new("account_closed").with_command("account close"),
            );

            if json {
                return print_json(&account);
            }
            output::success(&format!("Closed account {}", account.id));
        }
        AccountCommands::Statement { id, output: path, json } => {
            if json {
                let statement = ctx.statement_service.statement(id)?;
                return print_json(&statement);
            }

            match path {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    let lines = ctx.statement_service.write_csv(id, BufWriter::new(file))?;
                    println!(
                        "Wrote {} statement lines to {}",
                        lines,
                        path.display().to_string().bold()
                    );
                }
                None => {
                    ctx.statement_service.write_csv(id, std::io::stdout().lock())?;
                }
            }
        }
    }

    Ok(())
}
