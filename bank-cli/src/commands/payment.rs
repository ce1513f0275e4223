//! Payment command - hand outbound payments to the payments service

use anyhow::Result;
use bank_core::ports::{PaymentClient, PaymentInstruction, PaymentReceipt};
use bank_core::services::{AccountService, LogEvent};
use bank_core::Money;
use clap::Subcommand;
use comfy_table::Cell;
use uuid::Uuid;

use super::{get_context, get_logger, log_event, print_json};
use crate::output::{self, create_table};

#[derive(Subcommand)]
pub enum PaymentCommands {
    /// Submit a payment from an account to an external IBAN
    Submit {
        /// Debtor account id
        #[arg(long)]
        account: Uuid,
        /// Creditor IBAN
        #[arg(long)]
        iban: String,
        /// Amount, e.g. 12.50
        #[arg(long)]
        amount: Money,
        /// Caller reference, reused as the idempotency key
        #[arg(long)]
        reference: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look up a submitted payment
    Show {
        payment_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn receipt_table(receipt: &PaymentReceipt) -> comfy_table::Table {
    let mut table = create_table();
    table.add_row(vec![Cell::new("Payment"), Cell::new(&receipt.payment_id)]);
    table.add_row(vec![Cell::new("Reference"), Cell::new(&receipt.reference)]);
    table.add_row(vec![Cell::new("Status"), Cell::new(format!("{:?}", receipt.status).to_uppercase())]);
    table
}

pub fn run(command: PaymentCommands) -> Result<()> {
    let ctx = get_context()?;

    match command {
        PaymentCommands::Submit {
            account,
            iban,
            amount,
            reference,
            json,
        } => {
            let debtor = ctx.accounts.get_account(account)?;
            let instruction = PaymentInstruction {
                reference,
                debtor_account_id: debtor.id,
                creditor_iban: iban,
                amount,
                currency: debtor.currency,
            };
            let receipt = ctx.payments.submit_payment(&instruction)?;
            log_event(
                &get_logger(),
                LogEvent::new("payment_submitted").with_command("payment submit"),
            );

            if json {
                return print_json(&receipt);
            }
            output::success(&format!("Payment {} submitted", receipt.payment_id));
            println!("{}", receipt_table(&receipt));
        }
        PaymentCommands::Show { payment_id, json } => {
            let receipt = ctx.payments.get_payment(&payment_id)?;
            if json {
                return print_json(&receipt);
            }
            println!("{}", receipt_table(&receipt));
        }
    }

    Ok(())
}
