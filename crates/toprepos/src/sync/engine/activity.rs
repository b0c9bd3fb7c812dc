use sea_orm::DatabaseConnection;

use crate::aggregate::aggregate_by_day;
use crate::error::CommitWindow;
use crate::platform::{PlatformClient, collect_commits};
use crate::store;

use super::super::progress::{ProgressCallback, SyncProgress, emit};
use super::super::types::RepoActivityReport;

/// Fetch, aggregate and store one repository's activity for `window`.
///
/// Never fails. A failed fetch records nothing; a failed day write is
/// reported and the remaining days are still written.
pub async fn sync_repository_activity<C: PlatformClient + ?Sized>(
    client: &C,
    db: &DatabaseConnection,
    owner: &str,
    name: &str,
    window: &CommitWindow,
    on_progress: Option<&ProgressCallback>,
) -> RepoActivityReport {
    let fetch = collect_commits(client, owner, name, window, on_progress).await;
    let mut report = RepoActivityReport {
        owner: owner.to_string(),
        name: name.to_string(),
        commits: fetch.commits.len(),
        requests: fetch.requests,
        degraded: fetch.degraded,
        ..Default::default()
    };

    for (date, bucket) in aggregate_by_day(&fetch.commits) {
        match store::upsert_day(db, owner, name, date, bucket.commits, &bucket.authors).await {
            Ok(()) => report.days_written += 1,
            Err(e) => {
                let error = e.to_string();
                tracing::warn!(
                    repo = %format!("{}/{}", owner, name),
                    %date,
                    error = %error,
                    "Failed to store daily activity"
                );
                emit(
                    on_progress,
                    SyncProgress::ActivityDayFailed {
                        owner: owner.to_string(),
                        name: name.to_string(),
                        date,
                        error: error.clone(),
                    },
                );
                report.day_failures.push((date, error));
            }
        }
    }

    emit(
        on_progress,
        SyncProgress::RepoActivitySynced {
            owner: owner.to_string(),
            name: name.to_string(),
            commits: report.commits,
            days_written: report.days_written,
        },
    );

    report
}
