//! toprepos - a leaderboard of the most-starred GitHub repositories.
//!
//! The library keeps two tables in sync with GitHub:
//!
//! - `top_repositories`: the current top 100 by stars, with the rank each
//!   repository held in the previous cycle.
//! - `daily_activity`: per-day commit counts and author sets for every
//!   repository on the leaderboard.
//!
//! # Features
//!
//! - `sqlite` / `postgres` - database backends.
//! - `migrate` - Enables database migration support. When enabled, you can use
//!   [`connect_and_migrate`] to automatically run migrations on connection.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use toprepos::github::{DEFAULT_TIMEOUT, GitHubClient};
//! use toprepos::sync::{SyncOptions, run_batch};
//!
//! let db = toprepos::connect_and_migrate("sqlite://toprepos.db?mode=rwc").await?;
//! let client = GitHubClient::new(Some(&token), DEFAULT_TIMEOUT)?;
//!
//! let report = run_batch(&client, Arc::new(db), &SyncOptions::default(), None).await?;
//! println!("{} repositories ranked", report.ranked);
//! ```

pub mod aggregate;
pub mod db;
pub mod entity;
pub mod error;
pub mod github;
pub mod http;
pub mod platform;
pub mod retry;
pub mod store;
pub mod sync;

#[cfg(feature = "migrate")]
pub mod migration;

pub use aggregate::{DailyActivity, DayBucket, UNKNOWN_AUTHOR, aggregate_by_day};
pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use error::{CommitWindow, DateRange, Error, Result, ValidationError};
pub use platform::{
    ApiRateLimiter, CommitPage, PlatformClient, ProviderError, RankedRepository, RateLimitedClient,
    RawCommit, TopQuery, rate_limits,
};
pub use store::PersistenceError;
