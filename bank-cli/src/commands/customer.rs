//! Customer command - register account owners

use anyhow::Result;
use bank_core::ports::CustomerDirectory;
use bank_core::services::LogEvent;
use bank_core::Customer;
use clap::Subcommand;
use uuid::Uuid;

use super::{get_context, get_logger, log_event, print_json};
use crate::output;

#[derive(Subcommand)]
pub enum CustomerCommands {
    /// Register a new customer
    Add {
        /// Customer name
        #[arg(long)]
        name: String,
        /// Contact email
        #[arg(long)]
        email: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a customer
    Show {
        id: Uuid,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: CustomerCommands) -> Result<()> {
    let ctx = get_context()?;

    match command {
        CustomerCommands::Add { name, email, json } => {
            let mut customer = Customer::new(Uuid::new_v4(), name.trim());
            customer.email = email;
            ctx.store.add_customer(&customer)?;
            log_event(&get_logger(), LogEvent::new("customer_added").with_command("customer add"));

            if json {
                return print_json(&customer);
            }
            output::success(&format!("Customer {} added: {}", customer.name, customer.id));
        }
        CustomerCommands::Show { id, json } => {
            let customer = ctx
                .store
                .get_customer(id)?
                .ok_or_else(|| bank_core::Error::not_found(format!("customer {}", id)))?;
            if json {
                return print_json(&customer);
            }
            let mut table = output::create_table();
            table.add_row(vec!["Id".to_string(), customer.id.to_string()]);
            table.add_row(vec!["Name".to_string(), customer.name.clone()]);
            table.add_row(vec!["Email".to_string(), customer.email.clone().unwrap_or_default()]);
            table.add_row(vec![
                "Created".to_string(),
                customer.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]);
            println!("{}", table);
        }
    }

    Ok(())
}
