//! Helpers shared by the command handlers.

use std::time::Duration;

use clap::ValueEnum;
use console::style;
use serde::Serialize;
use tabled::{Table, Tabled};
use toprepos::PlatformClient;

/// Output format for listings.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

/// Render `rows` as a rounded table.
pub(crate) fn render_table<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    table.to_string()
}

/// Print `rows` in the requested format.
pub(crate) fn print_rows<T: Tabled + Serialize>(
    rows: Vec<T>,
    format: OutputFormat,
) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Table => println!("{}", render_table(rows)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
    }
    Ok(())
}

/// Display the `core` rate limit with a timeout to avoid hangs.
pub(crate) async fn display_rate_limit<C: PlatformClient>(client: &C, is_tty: bool, label: &str) {
    let limits = tokio::time::timeout(Duration::from_secs(5), client.get_rate_limits()).await;

    match limits {
        Ok(Ok(limits)) => {
            let Some(core) = limits.iter().find(|l| l.resource == "core") else {
                return;
            };
            if is_tty {
                println!(
                    "{}: {}/{} remaining (resets at {})",
                    label,
                    core.remaining,
                    core.limit,
                    core.reset_at.format("%H:%M:%S UTC")
                );
            } else {
                tracing::info!(
                    remaining = core.remaining,
                    limit = core.limit,
                    "{}",
                    label
                );
            }
        }
        Ok(Err(error)) => {
            if is_tty {
                eprintln!(
                    "{} Could not fetch rate limit: {}",
                    style("⚠").yellow(),
                    error
                );
            } else {
                tracing::warn!(error = %error, "Failed to fetch rate limit");
            }
        }
        Err(_) => {
            if is_tty {
                eprintln!("{} Timed out fetching rate limit", style("⚠").yellow());
            } else {
                tracing::warn!("Timed out fetching rate limit");
            }
        }
    }
}
