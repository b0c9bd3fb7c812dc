use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use toprepos::sync::{BatchPhase, SyncProgress};

const TICK: Duration = Duration::from_millis(100);

/// Bars of the current batch; all mutable state sits under one lock.
#[derive(Default)]
struct ProgressState {
    ranking_bar: Option<ProgressBar>,
    activity_bar: Option<ProgressBar>,
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self::with_multi(MultiProgress::new())
    }

    /// A reporter that draws nothing.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self::with_multi(MultiProgress::with_draw_target(
            indicatif::ProgressDrawTarget::hidden(),
        ))
    }

    fn with_multi(multi: MultiProgress) -> Self {
        Self {
            multi,
            state: Mutex::new(ProgressState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn handle(&self, event: SyncProgress) {
        let mut state = self.lock();

        match event {
            SyncProgress::PhaseChanged { phase } => match phase {
                BatchPhase::RankSync => {
                    let pb = self.multi.add(ProgressBar::new_spinner());
                    pb.set_style(Self::spinner_style());
                    pb.set_prefix(format!("{:10}", "Ranking"));
                    pb.set_message("Fetching top repositories...");
                    pb.enable_steady_tick(TICK);
                    state.ranking_bar = Some(pb);
                }
                BatchPhase::ActivitySync { tracked } => {
                    let pb = self.multi.add(ProgressBar::new(tracked as u64));
                    pb.set_style(Self::bar_style());
                    pb.set_prefix(format!("{:10}", "Activity"));
                    pb.set_message("Fetching commits...");
                    state.activity_bar = Some(pb);
                }
                BatchPhase::Idle => {
                    if let Some(ref pb) = state.ranking_bar
                        && !pb.is_finished()
                    {
                        pb.abandon_with_message("✗ ranking sync failed");
                    }
                }
            },

            SyncProgress::RankingFetched { count } => {
                if let Some(ref pb) = state.ranking_bar {
                    pb.set_message(format!("Fetched {} repositories, reconciling...", count));
                }
            }

            SyncProgress::RankingReconciled {
                added,
                updated,
                removed,
            } => {
                if let Some(ref pb) = state.ranking_bar {
                    pb.finish_with_message(format!(
                        "✓ {} new, {} kept, {} dropped",
                        added, updated, removed
                    ));
                }
            }

            SyncProgress::ActivityStarted { owner, name, .. } => {
                if let Some(ref pb) = state.activity_bar {
                    pb.set_message(format!("{}/{}", owner, name));
                }
            }

            SyncProgress::RepoActivitySynced {
                owner,
                name,
                commits,
                days_written,
            } => {
                if let Some(ref pb) = state.activity_bar {
                    pb.inc(1);
                    pb.set_message(format!(
                        "✓ {}/{}: {} commits over {} days",
                        owner, name, commits, days_written
                    ));
                }
            }

            SyncProgress::ActivityFetchFailed { owner, name, error } => {
                drop(state);
                self.multi
                    .println(format!("⚠ {}/{}: commit history unavailable ({})", owner, name, error))
                    .ok();
            }

            SyncProgress::ActivityDayFailed {
                owner,
                name,
                date,
                error,
            } => {
                drop(state);
                self.multi
                    .println(format!("✗ {}/{} {}: {}", owner, name, date, error))
                    .ok();
            }

            SyncProgress::RateLimitBackoff {
                target,
                retry_after_ms,
                attempt,
            } => {
                let message = format!(
                    "⏳ {} rate limited, retry {} in {:.1}s",
                    target,
                    attempt,
                    retry_after_ms as f64 / 1000.0
                );
                let bar = state
                    .activity_bar
                    .as_ref()
                    .or(state.ranking_bar.as_ref())
                    .filter(|pb| !pb.is_finished());
                if let Some(pb) = bar {
                    pb.set_message(message);
                }
            }

            SyncProgress::BatchComplete {
                repos_synced,
                repos_degraded,
                days_written,
                ..
            } => {
                if let Some(ref pb) = state.activity_bar {
                    let msg = if repos_degraded > 0 {
                        format!(
                            "✓ {} repositories, {} days written, {} unavailable",
                            repos_synced, days_written, repos_degraded
                        )
                    } else {
                        format!("✓ {} repositories, {} days written", repos_synced, days_written)
                    };
                    pb.finish_with_message(msg);
                }
            }

            SyncProgress::Warning { message } => {
                // Release lock before printing to avoid holding it during I/O
                drop(state);
                self.multi.println(format!("⚠ {}", message)).ok();
            }

            _ => {}
        }
    }

    #[cfg(test)]
    pub fn activity_position(&self) -> Option<u64> {
        self.lock().activity_bar.as_ref().map(ProgressBar::position)
    }

    /// Finish all progress bars.
    pub fn finish(&self) {
        let state = self.lock();
        for pb in [&state.ranking_bar, &state.activity_bar].into_iter().flatten() {
            if !pb.is_finished() {
                pb.finish();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_bar_counts_synced_repositories() {
        let reporter = InteractiveReporter::hidden();
        reporter.handle(SyncProgress::PhaseChanged {
            phase: BatchPhase::RankSync,
        });
        reporter.handle(SyncProgress::RankingReconciled {
            added: 2,
            updated: 0,
            removed: 0,
        });
        reporter.handle(SyncProgress::PhaseChanged {
            phase: BatchPhase::ActivitySync { tracked: 2 },
        });
        for name in ["rocket", "scratch"] {
            reporter.handle(SyncProgress::RepoActivitySynced {
                owner: "acme".to_string(),
                name: name.to_string(),
                commits: 1,
                days_written: 1,
            });
        }
        reporter.handle(SyncProgress::Warning {
            message: "printed above the bars".to_string(),
        });

        assert_eq!(reporter.activity_position(), Some(2));
        reporter.finish();
    }

    #[test]
    fn events_before_any_phase_are_ignored() {
        let reporter = InteractiveReporter::hidden();
        reporter.handle(SyncProgress::RankingFetched { count: 100 });
        assert_eq!(reporter.activity_position(), None);
    }
}
