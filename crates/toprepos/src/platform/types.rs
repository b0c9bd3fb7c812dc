use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CommitWindow;

use super::errors::Result;

/// Records per page for every paginated provider call.
pub const PAGE_SIZE: u32 = 100;

/// One entry of a fetched ranking.
///
/// `position_current` is the 1-based rank within the response it came from.
/// `position_previous` is always `None` on fetch; the store fills in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedRepository {
    pub owner: String,
    pub name: String,
    pub position_current: i32,
    pub position_previous: Option<i32>,
    pub stars: i64,
    pub watchers: i64,
    pub forks: i64,
    pub open_issues: i64,
    pub language: Option<String>,
}

impl RankedRepository {
    /// The `owner/name` key of the ranking table.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// A commit as the aggregator sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit {
    /// `None` when the provider had no author name for the commit.
    pub author_name: Option<String>,
    /// Author timestamp in the offset the commit was recorded with.
    pub authored_at: DateTime<FixedOffset>,
}

/// One response page of a commit listing.
///
/// `fetched` counts the items the provider sent, including any dropped
/// because they carried no usable timestamp. Pagination ends on it, never on
/// `commits.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitPage {
    pub commits: Vec<RawCommit>,
    pub fetched: usize,
}

impl CommitPage {
    /// A page where every fetched item converted.
    pub fn complete(commits: Vec<RawCommit>) -> Self {
        let fetched = commits.len();
        Self { commits, fetched }
    }
}

/// Search parameters for the ranking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopQuery {
    pub query: String,
    pub sort: String,
    pub order: String,
    pub per_page: u32,
}

impl Default for TopQuery {
    fn default() -> Self {
        Self {
            query: "stars:>1".to_string(),
            sort: "stars".to_string(),
            order: "desc".to_string(),
            per_page: PAGE_SIZE,
        }
    }
}

/// Rate limit status for one provider resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitInfo {
    pub resource: String,
    pub limit: usize,
    pub remaining: usize,
    pub used: usize,
    pub reset_at: DateTime<Utc>,
}

/// The external ranked-item and commit provider.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Fetch the ranking: one request, at most `query.per_page` records.
    async fn search_top_repos(&self, query: &TopQuery) -> Result<Vec<RankedRepository>>;

    /// Fetch one page of commits for `owner/repo` inside `window`.
    ///
    /// Pages start at 1. A page whose `fetched` count is zero or below
    /// `per_page` is the last one.
    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        window: &CommitWindow,
        page: u32,
        per_page: u32,
    ) -> Result<CommitPage>;

    /// Current rate limit status per resource.
    async fn get_rate_limits(&self) -> Result<Vec<RateLimitInfo>>;
}
