//! toprepos CLI - keeps a local leaderboard of the most-starred GitHub
//! repositories and their daily commit activity.

mod commands;
mod config;
mod progress;
mod shutdown;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

use crate::commands::OutputFormat;
use crate::commands::top::{SortDirectionArg, SortKeyArg};

#[derive(Parser)]
#[command(name = "toprepos")]
#[command(version)]
#[command(about = "A leaderboard of the most-starred GitHub repositories")]
#[command(
    long_about = "toprepos fetches the top 100 GitHub repositories by stars, keeps their \
current and previous rank in a local database, and records how many commits each \
of them received per day and by whom."
)]
#[command(after_long_help = r#"EXAMPLES
    Run one sync cycle (ranking, then yesterday's activity):
        $ toprepos sync

    Backfill the last week of activity:
        $ toprepos sync --days 7

    Show the leaderboard ordered by forks:
        $ toprepos top --sort-by forks

    Show a repository's activity for a date range:
        $ toprepos activity rust-lang rust --since 2024-03-01 --until 2024-03-07

CONFIGURATION
    toprepos reads configuration from:
      1. ~/.config/toprepos/config.toml (or $XDG_CONFIG_HOME/toprepos/config.toml)
      2. ./toprepos.toml
      3. Environment variables (TOPREPOS_ prefix, `__` between section and key)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    TOPREPOS_DATABASE__URL    Database connection string (default: ~/.local/state/toprepos/toprepos.db)
    TOPREPOS_GITHUB__TOKEN    GitHub personal access token (GITHUB_TOKEN is also read)
    TOPREPOS_SYNC__CONCURRENCY
                              Repositories synced at once
    RUST_LOG                  Log filter (default: toprepos=info,toprepos_cli=info)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Sync the ranking, then daily activity of every ranked repository
    Sync(SyncArgs),
    /// Show the stored leaderboard
    Top {
        /// Column to order by
        #[arg(short, long, value_enum, default_value_t = SortKeyArg::Stars)]
        sort_by: SortKeyArg,

        /// Sort direction
        #[arg(long, value_enum, default_value_t = SortDirectionArg::Desc)]
        order: SortDirectionArg,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Show stored daily activity of one repository
    Activity {
        /// Repository owner
        owner: String,

        /// Repository name
        repo: String,

        /// First day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        since: chrono::NaiveDate,

        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        until: chrono::NaiveDate,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Show current GitHub rate limit status
    Limits {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

/// Options of the `sync` command.
#[derive(Debug, Clone, clap::Args)]
struct SyncArgs {
    /// Days of commit history to sync, ending at midnight UTC today (default from config or 1)
    #[arg(short = 'd', long)]
    days: Option<u32>,

    /// Maximum repositories synced concurrently (default from config or 4)
    #[arg(short = 'c', long)]
    concurrency: Option<usize>,

    /// Disable proactive rate limiting (may cause API throttling)
    #[arg(short = 'R', long)]
    no_rate_limit: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Set up graceful shutdown handler (Ctrl+C)
    shutdown::setup_shutdown_handler();

    // Structured logging when not attached to a terminal; progress bars otherwise
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("toprepos=info,toprepos_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let cli = Cli::parse();

    // Rate limit status needs no database
    if let Commands::Limits { output } = &cli.command {
        commands::limits::handle_limits(*output, &config).await?;
        return Ok(());
    }

    let database_url = config
        .database_url()
        .ok_or("Could not determine a database location; set TOPREPOS_DATABASE__URL")?;

    // Ensure the database directory exists for SQLite
    if database_url.starts_with("sqlite://") {
        let db_path = database_url.trim_start_matches("sqlite://");
        // Strip query parameters (e.g., ?mode=rwc) before path operations
        let db_path = db_path.split('?').next().unwrap_or(db_path);
        let db_path = std::path::Path::new(db_path);

        if db_path.is_relative() && !db_path.as_os_str().is_empty() {
            tracing::warn!(
                "Database path '{}' is relative - behavior depends on current directory. \
                 Consider using an absolute path.",
                db_path.display()
            );
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
    }

    match cli.command {
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::Sync(args) => {
            commands::sync::handle_sync(args, &config, &database_url).await?;
        }
        Commands::Top {
            sort_by,
            order,
            output,
        } => {
            commands::top::handle_top(sort_by, order, output, &database_url).await?;
        }
        Commands::Activity {
            owner,
            repo,
            since,
            until,
            output,
        } => {
            commands::activity::handle_activity(
                &owner,
                &repo,
                since,
                until,
                output,
                &database_url,
            )
            .await?;
        }
        Commands::Limits { .. } => {}
    }

    Ok(())
}
