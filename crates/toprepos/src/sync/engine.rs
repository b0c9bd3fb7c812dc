//! Batch orchestration: ranking first, then activity per tracked repository.
//!
//! ```ignore
//! use std::sync::Arc;
//! use toprepos::sync::{SyncOptions, run_batch};
//!
//! let report = run_batch(&client, Arc::new(db), &SyncOptions::default(), None).await?;
//! println!("{} repositories ranked, {} days written", report.ranked, report.days_written);
//! ```

mod activity;
mod ranking;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use sea_orm::DatabaseConnection;
use tokio::sync::Semaphore;

use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::{BatchPhase, BatchReport, RepoActivityReport, SyncOptions};
use crate::platform::PlatformClient;
use crate::store;

pub use activity::sync_repository_activity;
pub use ranking::sync_ranking;

enum RepoOutcome {
    Synced(RepoActivityReport),
    Skipped { owner: String, name: String },
}

/// Run one full sync cycle.
///
/// Ranking failures are fatal: the error is returned and no activity is
/// synced. Once the ranking is committed the batch always returns `Ok`,
/// with later problems (including an unreadable tracked list) recorded in
/// the report.
///
/// Repositories sync concurrently, at most `options.concurrency` at a time.
/// When the cancel flag is raised, repositories not yet started are skipped
/// and in-flight ones finish.
pub async fn run_batch<C: PlatformClient + Clone + 'static>(
    client: &C,
    db: Arc<DatabaseConnection>,
    options: &SyncOptions,
    on_progress: Option<Arc<ProgressCallback>>,
) -> crate::Result<BatchReport> {
    let progress = on_progress.as_deref();
    let mut report = BatchReport::default();

    emit(
        progress,
        SyncProgress::PhaseChanged {
            phase: BatchPhase::RankSync,
        },
    );
    let ranking = match sync_ranking(client, &db, &options.query, progress).await {
        Ok(ranking) => ranking,
        Err(e) => {
            emit(
                progress,
                SyncProgress::PhaseChanged {
                    phase: BatchPhase::Idle,
                },
            );
            return Err(e);
        }
    };
    report.record_ranking(ranking);

    let tracked = match store::tracked(&db).await {
        Ok(tracked) => tracked,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read tracked repositories");
            report.errors.push(format!("Reading tracked repositories: {}", e));
            Vec::new()
        }
    };
    let total = tracked.len();
    emit(
        progress,
        SyncProgress::PhaseChanged {
            phase: BatchPhase::ActivitySync { tracked: total },
        },
    );
    tracing::info!(
        tracked = total,
        since = %options.window.since(),
        until = %options.window.until(),
        "Syncing activity"
    );

    let concurrency = options.concurrency.clamp(1, total.max(1));
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut handles = Vec::with_capacity(total);

    for (index, (owner, name)) in tracked.into_iter().enumerate() {
        let client = client.clone();
        let db = Arc::clone(&db);
        let semaphore = Arc::clone(&semaphore);
        let cancel = options.cancel.clone();
        let window = options.window;
        let on_progress = on_progress.clone();

        let handle = tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return RepoOutcome::Skipped { owner, name },
            };

            if cancel.as_ref().is_some_and(|f| f.load(Ordering::Relaxed)) {
                return RepoOutcome::Skipped { owner, name };
            }

            let progress = on_progress.as_deref();
            emit(
                progress,
                SyncProgress::ActivityStarted {
                    owner: owner.clone(),
                    name: name.clone(),
                    index: index + 1,
                    total,
                },
            );

            RepoOutcome::Synced(
                sync_repository_activity(&client, &db, &owner, &name, &window, progress).await,
            )
        });

        handles.push(handle);
    }

    for handle in handles {
        match handle.await {
            Ok(RepoOutcome::Synced(repo)) => report.record_repo(repo),
            Ok(RepoOutcome::Skipped { owner, name }) => {
                report.repos_skipped += 1;
                tracing::debug!(repo = %format!("{}/{}", owner, name), "Skipped after cancellation");
            }
            Err(e) => {
                tracing::error!(error = %e, "Activity task failed");
                report.errors.push(format!("Task panic: {}", e));
            }
        }
    }

    if report.repos_skipped > 0 {
        emit(
            progress,
            SyncProgress::Warning {
                message: format!(
                    "Cancelled: {} repositories were not synced",
                    report.repos_skipped
                ),
            },
        );
    }

    emit(
        progress,
        SyncProgress::PhaseChanged {
            phase: BatchPhase::Idle,
        },
    );
    emit(
        progress,
        SyncProgress::BatchComplete {
            ranked: report.ranked,
            repos_synced: report.repos_synced,
            repos_degraded: report.repos_degraded,
            repos_skipped: report.repos_skipped,
            days_written: report.days_written,
        },
    );

    tracing::info!(
        ranked = report.ranked,
        repos_synced = report.repos_synced,
        repos_degraded = report.repos_degraded,
        days_written = report.days_written,
        day_failures = report.day_failures,
        "Batch complete"
    );

    Ok(report)
}
