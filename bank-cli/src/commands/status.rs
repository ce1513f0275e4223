//! Status command - ledger summary

use anyhow::Result;
use colored::Colorize;

use super::{get_context, print_json};
use crate::output::create_table;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service.get_status()?;

    if json {
        return print_json(&status);
    }

    println!("{}", "Ledger Status".bold());
    println!();

    let mut table = create_table();
    table.add_row(vec!["Customers".to_string(), status.total_customers.to_string()]);
    table.add_row(vec![
        "Accounts".to_string(),
        format!("{} ({} closed)", status.total_accounts, status.closed_accounts),
    ]);
    table.add_row(vec!["Transactions".to_string(), status.total_transactions.to_string()]);
    for (state, count) in &status.transactions {
        table.add_row(vec![format!("  {}", state), count.to_string()]);
    }
    println!("{}", table);

    if !status.holdings.is_empty() {
        println!();
        println!("{}", "Holdings".bold());
        for holding in &status.holdings {
            println!("  {} {}", holding.currency, holding.total);
        }
    }

    Ok(())
}
