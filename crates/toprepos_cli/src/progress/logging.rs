use toprepos::sync::{BatchPhase, SyncProgress};

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::PhaseChanged { phase } => match phase {
                BatchPhase::Idle => tracing::debug!("Batch idle"),
                BatchPhase::RankSync => tracing::info!("Syncing ranking"),
                BatchPhase::ActivitySync { tracked } => {
                    tracing::info!(tracked, "Syncing daily activity");
                }
            },

            SyncProgress::RankingFetched { count } => {
                tracing::info!(count, "Fetched ranking");
            }

            SyncProgress::RankingReconciled {
                added,
                updated,
                removed,
            } => {
                tracing::info!(added, updated, removed, "Ranking reconciled");
            }

            SyncProgress::ActivityStarted {
                owner,
                name,
                index,
                total,
            } => {
                tracing::debug!(repo = %format!("{}/{}", owner, name), index, total, "Syncing activity");
            }

            SyncProgress::ActivityFetchFailed { owner, name, error } => {
                tracing::warn!(repo = %format!("{}/{}", owner, name), error = %error, "Commit history unavailable");
            }

            SyncProgress::ActivityDayFailed {
                owner,
                name,
                date,
                error,
            } => {
                tracing::error!(repo = %format!("{}/{}", owner, name), %date, error = %error, "Failed to save day");
            }

            SyncProgress::RepoActivitySynced {
                owner,
                name,
                commits,
                days_written,
            } => {
                tracing::info!(repo = %format!("{}/{}", owner, name), commits, days_written, "Activity synced");
            }

            SyncProgress::RateLimitBackoff {
                target,
                retry_after_ms,
                attempt,
            } => {
                tracing::warn!(
                    endpoint = %target,
                    retry_after_ms,
                    attempt,
                    "Rate limited, backing off"
                );
            }

            SyncProgress::BatchComplete {
                ranked,
                repos_synced,
                repos_degraded,
                repos_skipped,
                days_written,
            } => {
                tracing::info!(
                    ranked,
                    repos_synced,
                    repos_degraded,
                    repos_skipped,
                    days_written,
                    "Sync complete"
                );
            }

            SyncProgress::Warning { message } => {
                tracing::warn!(message = %message, "Warning");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_every_event_without_a_subscriber() {
        let reporter = LoggingReporter::new();
        reporter.handle(SyncProgress::PhaseChanged {
            phase: BatchPhase::RankSync,
        });
        reporter.handle(SyncProgress::RankingReconciled {
            added: 1,
            updated: 99,
            removed: 1,
        });
        reporter.handle(SyncProgress::RateLimitBackoff {
            target: "search".to_string(),
            retry_after_ms: 1_000,
            attempt: 1,
        });
        reporter.handle(SyncProgress::Warning {
            message: "cancelled".to_string(),
        });
    }
}
