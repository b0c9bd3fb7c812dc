//! Crate-level error type and validated time ranges.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

use crate::platform::ProviderError;
use crate::store::PersistenceError;

/// Caller-supplied input rejected before any I/O.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// `since` is after `until`.
    #[error("Invalid range: since ({since}) is after until ({until})")]
    InvalidRange { since: String, until: String },

    /// A commit window must cover at least one day.
    #[error("Invalid window: {days} days")]
    InvalidWindow { days: u32 },
}

impl ValidationError {
    fn range(since: impl ToString, until: impl ToString) -> Self {
        Self::InvalidRange {
            since: since.to_string(),
            until: until.to_string(),
        }
    }
}

/// Errors surfaced by the batch job and the read-side queries.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result type for top-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The `[since, until]` timestamps commits are fetched for.
///
/// Construction guarantees `since <= until`, so the fetch layer never has to
/// check it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitWindow {
    since: DateTime<Utc>,
    until: DateTime<Utc>,
}

impl CommitWindow {
    pub fn new(
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> std::result::Result<Self, ValidationError> {
        if since > until {
            return Err(ValidationError::range(since, until));
        }
        Ok(Self { since, until })
    }

    /// The `days` whole UTC days before the midnight that starts `now`'s day.
    ///
    /// `previous_days(now, 1)` is "yesterday": `[yesterday 00:00, today 00:00]`.
    pub fn previous_days(
        now: DateTime<Utc>,
        days: u32,
    ) -> std::result::Result<Self, ValidationError> {
        if days == 0 {
            return Err(ValidationError::InvalidWindow { days });
        }
        let until = now
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc();
        let since = until
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or(ValidationError::InvalidWindow { days })?;
        Ok(Self { since, until })
    }

    pub fn since(&self) -> DateTime<Utc> {
        self.since
    }

    pub fn until(&self) -> DateTime<Utc> {
        self.until
    }
}

impl Default for CommitWindow {
    fn default() -> Self {
        let until = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
        let since = until - chrono::Duration::days(1);
        Self { since, until }
    }
}

/// An inclusive range of calendar days, `since <= until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    since: NaiveDate,
    until: NaiveDate,
}

impl DateRange {
    pub fn new(since: NaiveDate, until: NaiveDate) -> std::result::Result<Self, ValidationError> {
        if since > until {
            return Err(ValidationError::range(since, until));
        }
        Ok(Self { since, until })
    }

    pub fn since(&self) -> NaiveDate {
        self.since
    }

    pub fn until(&self) -> NaiveDate {
        self.until
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.since <= date && date <= self.until
    }
}
