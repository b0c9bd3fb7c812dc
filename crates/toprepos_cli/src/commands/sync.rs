//! The `sync` command: one full batch against GitHub.

use std::sync::Arc;

use console::{Term, style};
use sea_orm::DatabaseConnection;
use toprepos::github::GitHubClient;
use toprepos::retry::RetryConfig;
use toprepos::sync::{BatchReport, SyncOptions, run_batch};
use toprepos::{CommitWindow, PlatformClient, RateLimitedClient, db};

use crate::SyncArgs;
use crate::commands::shared::display_rate_limit;
use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::shutdown::{cancel_flag, is_shutdown_requested};

/// Most batch problems listed before the rest are summarized.
const MAX_LISTED_ERRORS: usize = 10;

/// Effective settings after merging flags over config.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SyncSettings {
    days: u32,
    concurrency: usize,
    no_rate_limit: bool,
}

fn merge_sync_options(args: &SyncArgs, config: &Config) -> SyncSettings {
    SyncSettings {
        days: args.days.unwrap_or(config.sync.window_days),
        concurrency: args.concurrency.unwrap_or(config.sync.concurrency),
        no_rate_limit: args.no_rate_limit || config.sync.no_rate_limit,
    }
}

pub(crate) async fn handle_sync(
    args: SyncArgs,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = merge_sync_options(&args, config);
    let window = CommitWindow::previous_days(chrono::Utc::now(), settings.days)?;
    let is_tty = Term::stdout().is_term();

    let db = Arc::new(db::connect_and_migrate(database_url).await?);

    let reporter = Arc::new(ProgressReporter::new());
    let on_progress = reporter.as_callback();

    let token = config.github_token();
    if token.is_none() {
        if is_tty {
            eprintln!(
                "{} No GitHub token configured; anonymous requests are heavily rate limited\n",
                style("⚠").yellow()
            );
        } else {
            tracing::warn!("No GitHub token configured, using anonymous access");
        }
    }

    let client = GitHubClient::new(token.as_deref(), config.github_timeout())?
        .with_api_url(&config.github.api_url)
        .with_retry_config(RetryConfig::default().with_max_retries(config.sync.max_retries))
        .with_progress(Arc::clone(&on_progress));

    let options = SyncOptions::default()
        .with_window(window)
        .with_concurrency(settings.concurrency)
        .with_cancel_flag(cancel_flag());

    if is_tty {
        println!(
            "Syncing ranking and activity from {} to {}",
            window.since().format("%Y-%m-%d %H:%M UTC"),
            window.until().format("%Y-%m-%d %H:%M UTC")
        );
    }

    let result = if settings.no_rate_limit {
        if is_tty {
            eprintln!("Warning: Rate limiting disabled - you may experience API throttling\n");
        }
        run(&client, db, &options, on_progress, is_tty).await
    } else {
        let client = RateLimitedClient::new(client, config.sync.requests_per_second);
        run(&client, db, &options, on_progress, is_tty).await
    };

    reporter.finish();
    let report = result?;
    print_report(&report, is_tty);

    if is_shutdown_requested() {
        return Err("sync interrupted".into());
    }
    Ok(())
}

async fn run<C: PlatformClient + Clone + 'static>(
    client: &C,
    db: Arc<DatabaseConnection>,
    options: &SyncOptions,
    on_progress: Arc<toprepos::sync::ProgressCallback>,
    is_tty: bool,
) -> toprepos::Result<BatchReport> {
    display_rate_limit(client, is_tty, "Rate limit").await;
    let report = run_batch(client, db, options, Some(on_progress)).await?;
    display_rate_limit(client, is_tty, "Rate limit after sync").await;
    Ok(report)
}

fn print_report(report: &BatchReport, is_tty: bool) {
    if !is_tty {
        for error in report.errors.iter().take(MAX_LISTED_ERRORS) {
            tracing::warn!(error = %error, "Batch problem");
        }
        return;
    }

    println!();
    println!(
        "{} {} ranked ({} new, {} kept, {} dropped)",
        style("Ranking:").bold(),
        report.ranked,
        report.added,
        report.updated,
        report.removed
    );
    println!(
        "{} {} repositories, {} commits, {} days written",
        style("Activity:").bold(),
        report.repos_synced,
        report.commits_seen,
        report.days_written
    );

    if report.repos_skipped > 0 {
        println!(
            "{} {} repositories skipped after Ctrl+C",
            style("⚠").yellow(),
            report.repos_skipped
        );
    }

    if !report.errors.is_empty() {
        let total = report.errors.len();
        eprintln!("{}", style(format!("Problems ({} total):", total)).yellow().bold());
        for error in report.errors.iter().take(MAX_LISTED_ERRORS) {
            eprintln!("  - {}", error);
        }
        if total > MAX_LISTED_ERRORS {
            eprintln!("  ... and {} more", total - MAX_LISTED_ERRORS);
        }
    }
}
