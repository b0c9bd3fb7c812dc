//! Batch options, phases and reports.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use chrono::NaiveDate;

use crate::error::CommitWindow;
use crate::platform::TopQuery;
use crate::store::RankingOutcome;

/// Default number of repositories whose activity syncs at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default commit window length in days, ending at midnight UTC today.
pub const DEFAULT_WINDOW_DAYS: u32 = 1;

/// Maximum backoff delay in milliseconds when rate limited.
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Initial backoff delay in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 1_000;

/// Retries of a single rate-limited request.
pub const MAX_RATE_LIMIT_RETRIES: usize = 5;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Commit history window for the activity phase.
    pub window: CommitWindow,
    /// Maximum repositories synced concurrently (0 is treated as 1).
    pub concurrency: usize,
    /// Ranking search parameters.
    pub query: TopQuery,
    /// When set, repositories not yet started are skipped.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            window: CommitWindow::default(),
            concurrency: DEFAULT_CONCURRENCY,
            query: TopQuery::default(),
            cancel: None,
        }
    }
}

impl SyncOptions {
    #[must_use]
    pub fn with_window(mut self, window: CommitWindow) -> Self {
        self.window = window;
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Where a batch is. `ActivitySync` covers the per-repository loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Idle,
    RankSync,
    ActivitySync { tracked: usize },
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchPhase::Idle => write!(f, "idle"),
            BatchPhase::RankSync => write!(f, "ranking sync"),
            BatchPhase::ActivitySync { tracked } => {
                write!(f, "activity sync ({} repositories)", tracked)
            }
        }
    }
}

/// Result of the ranking phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankingSync {
    /// Records the provider returned.
    pub ranked: usize,
    pub outcome: RankingOutcome,
}

/// Result of one repository's activity sync.
#[derive(Debug, Clone, Default)]
pub struct RepoActivityReport {
    pub owner: String,
    pub name: String,
    /// Commits fetched in the window.
    pub commits: usize,
    /// Page requests issued.
    pub requests: u32,
    /// The commit fetch failed and nothing was recorded.
    pub degraded: bool,
    pub days_written: usize,
    /// Days whose write failed, with the error.
    pub day_failures: Vec<(NaiveDate, String)>,
}

/// Counts for a whole batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub ranked: usize,
    pub added: u64,
    pub updated: u64,
    pub removed: u64,
    /// Repositories whose activity phase ran (degraded ones included).
    pub repos_synced: usize,
    /// Repositories whose commit fetch failed.
    pub repos_degraded: usize,
    /// Repositories skipped after cancellation.
    pub repos_skipped: usize,
    pub commits_seen: usize,
    pub days_written: usize,
    pub day_failures: usize,
    /// Non-fatal problems, one line each.
    pub errors: Vec<String>,
}

impl BatchReport {
    /// Nothing degraded, failed or skipped.
    pub fn is_clean(&self) -> bool {
        self.repos_degraded == 0
            && self.repos_skipped == 0
            && self.day_failures == 0
            && self.errors.is_empty()
    }

    pub(crate) fn record_ranking(&mut self, ranking: RankingSync) {
        self.ranked = ranking.ranked;
        self.added = ranking.outcome.added;
        self.updated = ranking.outcome.updated;
        self.removed = ranking.outcome.removed;
    }

    pub(crate) fn record_repo(&mut self, report: RepoActivityReport) {
        self.repos_synced += 1;
        self.commits_seen += report.commits;
        self.days_written += report.days_written;
        self.day_failures += report.day_failures.len();
        if report.degraded {
            self.repos_degraded += 1;
            self.errors.push(format!(
                "{}/{}: commit history unavailable",
                report.owner, report.name
            ));
        }
        for (date, error) in report.day_failures {
            self.errors
                .push(format!("{}/{} {}: {}", report.owner, report.name, date, error));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_options_default() {
        let options = SyncOptions::default();
        assert_eq!(options.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(options.query, TopQuery::default());
        assert!(options.cancel.is_none());
        assert_eq!(
            options.window.until() - options.window.since(),
            chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_batch_phase_display() {
        assert_eq!(BatchPhase::Idle.to_string(), "idle");
        assert_eq!(
            BatchPhase::ActivitySync { tracked: 100 }.to_string(),
            "activity sync (100 repositories)"
        );
    }

    #[test]
    fn test_batch_report_accumulates_repositories() {
        let mut report = BatchReport::default();
        report.record_ranking(RankingSync {
            ranked: 2,
            outcome: RankingOutcome {
                added: 1,
                updated: 1,
                removed: 0,
            },
        });
        report.record_repo(RepoActivityReport {
            owner: "acme".to_string(),
            name: "rocket".to_string(),
            commits: 5,
            requests: 1,
            degraded: false,
            days_written: 2,
            day_failures: vec![(
                NaiveDate::from_ymd_opt(2024, 3, 5).expect("valid date"),
                "locked".to_string(),
            )],
        });
        report.record_repo(RepoActivityReport {
            owner: "acme".to_string(),
            name: "flaky".to_string(),
            degraded: true,
            ..Default::default()
        });

        assert_eq!(report.ranked, 2);
        assert_eq!(report.repos_synced, 2);
        assert_eq!(report.repos_degraded, 1);
        assert_eq!(report.commits_seen, 5);
        assert_eq!(report.days_written, 2);
        assert_eq!(report.day_failures, 1);
        assert_eq!(report.errors.len(), 2);
        assert!(!report.is_clean());
        assert!(BatchReport::default().is_clean());
    }
}
