//! Provider-agnostic view of the ranking and commit source.
//!
//! [`PlatformClient`] is the seam between the sync engine and GitHub: the
//! engine only ever asks for a ranking and for commit pages. Anything that
//! implements it (the real client, a rate-limited wrapper, a test fake) can
//! drive a batch.

mod errors;
pub mod pagination;
mod rate_limit;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{ProviderError, Result, short_error_message};
pub use pagination::{CommitFetch, CommitPager, collect_commits};
pub use rate_limit::{ApiRateLimiter, RateLimitedClient, rate_limits};
pub use types::{
    CommitPage, PAGE_SIZE, PlatformClient, RankedRepository, RateLimitInfo, RawCommit, TopQuery,
};
