//! Doctor command - run ledger health checks

use anyhow::Result;
use colored::Colorize;
use comfy_table::{Cell, Color};
use serde_json::Value;

use super::{get_context, print_json};
use crate::output::create_table;

/// Format a detail JSON value for display
fn format_detail(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            // Format as "key: value, key: value"
            let parts: Vec<String> = map
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| {
                    let display_val = match v {
                        Value::String(s) => s.clone(),
                        _ => v.to_string(),
                    };
                    format!("{}: {}", k, display_val)
                })
                .collect();
            parts.join(", ")
        }
        Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}

pub fn run(verbose: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.doctor_service.run_checks()?;

    if json {
        print_json(&result)?;
    } else {
        println!("{}", "Ledger Health Check".bold());
        println!();

        let mut table = create_table();
        table.set_header(vec!["Check", "Status", "Message"]);

        let mut names: Vec<&String> = result.checks.keys().collect();
        names.sort();
        for check_name in names {
            let check_result = &result.checks[check_name];
            let status_cell = match check_result.status.as_str() {
                "pass" => Cell::new("PASS").fg(Color::Green),
                "warning" => Cell::new("WARN").fg(Color::Yellow),
                "error" => Cell::new("ERROR").fg(Color::Red),
                _ => Cell::new(&check_result.status),
            };

            table.add_row(vec![
                Cell::new(check_name),
                status_cell,
                Cell::new(&check_result.message),
            ]);

            if verbose {
                if let Some(details) = &check_result.details {
                    for detail in details {
                        table.add_row(vec![
                            Cell::new(""),
                            Cell::new(""),
                            Cell::new(format!("  - {}", format_detail(detail))),
                        ]);
                    }
                }
            }
        }

        println!("{}", table);
        println!();

        println!(
            "Summary: {} passed, {} warnings, {} errors",
            result.summary.passed.to_string().green(),
            result.summary.warnings.to_string().yellow(),
            result.summary.errors.to_string().red(),
        );
    }

    if result.summary.errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}
