//! Batch synchronization of the ranking and daily commit activity.
//!
//! # Module Structure
//!
//! - [`types`] - Options, phases, reports and constants
//! - [`progress`] - Progress reporting: `SyncProgress`, `ProgressCallback`, `emit()`
//! - [`engine`] - `sync_ranking()`, `sync_repository_activity()`, `run_batch()`
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use toprepos::sync::{SyncOptions, run_batch};
//!
//! async fn sync<C: PlatformClient + Clone + 'static>(client: &C, db: DatabaseConnection) {
//!     let report = run_batch(client, Arc::new(db), &SyncOptions::default(), None).await?;
//!     println!("Tracked {} repositories", report.ranked);
//! }
//! ```

pub mod engine;
mod progress;
mod types;

pub use types::{BatchPhase, BatchReport, RankingSync, RepoActivityReport, SyncOptions};

pub use types::{
    DEFAULT_CONCURRENCY, DEFAULT_WINDOW_DAYS, INITIAL_BACKOFF_MS, MAX_BACKOFF_MS,
    MAX_RATE_LIMIT_RETRIES,
};

pub use progress::{ProgressCallback, SyncProgress, emit};

pub use engine::{run_batch, sync_ranking, sync_repository_activity};
