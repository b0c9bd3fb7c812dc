//! Progress events emitted while a batch runs.
//!
//! The library never prints. Front ends subscribe with a [`ProgressCallback`]
//! and turn events into log lines or progress bars.

use chrono::NaiveDate;

use super::types::BatchPhase;

#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// The batch moved to another phase.
    PhaseChanged { phase: BatchPhase },

    /// The ranking request returned.
    RankingFetched { count: usize },

    /// The ranking table now matches the fetched ranking.
    RankingReconciled {
        added: u64,
        updated: u64,
        removed: u64,
    },

    /// Starting the activity sync of one tracked repository.
    ActivityStarted {
        owner: String,
        name: String,
        /// 1-based position in the tracked list.
        index: usize,
        total: usize,
    },

    /// Commit history could not be fetched; no activity is recorded for
    /// this repository in this cycle.
    ActivityFetchFailed {
        owner: String,
        name: String,
        error: String,
    },

    /// Writing one day failed; other days of the repository still proceed.
    ActivityDayFailed {
        owner: String,
        name: String,
        date: NaiveDate,
        error: String,
    },

    /// A repository's activity sync finished.
    RepoActivitySynced {
        owner: String,
        name: String,
        commits: usize,
        days_written: usize,
    },

    /// Rate limited, backing off before retry.
    RateLimitBackoff {
        /// Endpoint label, e.g. `search` or `owner/name`.
        target: String,
        retry_after_ms: u64,
        attempt: u32,
    },

    /// The batch finished.
    BatchComplete {
        ranked: usize,
        repos_synced: usize,
        repos_degraded: usize,
        repos_skipped: usize,
        days_written: usize,
    },

    /// Warning message (non-fatal).
    Warning { message: String },
}

/// Callback for progress updates during a batch.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_with_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        let callback: ProgressCallback = Box::new(move |_event| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        emit(Some(&callback), SyncProgress::RankingFetched { count: 100 });
        emit(
            Some(&callback),
            SyncProgress::PhaseChanged {
                phase: BatchPhase::RankSync,
            },
        );

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_emit_without_callback() {
        emit(None, SyncProgress::RankingFetched { count: 100 });
    }

    #[test]
    fn test_sync_progress_debug() {
        let event = SyncProgress::ActivityDayFailed {
            owner: "rust-lang".to_string(),
            name: "rust".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 5).expect("valid date"),
            error: "database is locked".to_string(),
        };

        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("ActivityDayFailed"));
        assert!(debug_str.contains("rust-lang"));
        assert!(debug_str.contains("2024-03-05"));
        assert!(debug_str.contains("database is locked"));
    }
}
