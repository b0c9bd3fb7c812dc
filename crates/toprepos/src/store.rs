//! Persistence for the ranking and daily activity tables.
//!
//! - [`ranking`] - reconciling a fresh ranking, reading it back
//! - [`activity`] - per-day activity upserts and range queries
//!
//! Every write is a single `INSERT ... ON CONFLICT DO UPDATE` or `DELETE`
//! statement, so concurrent writers never observe a half-applied row.

pub mod activity;
mod errors;
pub mod ranking;

pub use activity::{activity_in_range, between, upsert_day};
pub use errors::{PersistenceError, Result};
pub use ranking::{RankingOutcome, SortDirection, SortKey, list_sorted, reconcile, tracked};
