//! Conversion from GitHub payloads to provider-neutral records.

use chrono::DateTime;

use super::types::{CommitItem, GitHubRateLimitResponse, SearchItem};
use crate::platform::{RankedRepository, RateLimitInfo, RawCommit};

/// Turn search results into a ranking, numbering positions from 1 in
/// response order.
pub fn to_ranking(items: Vec<SearchItem>) -> Vec<RankedRepository> {
    items
        .into_iter()
        .zip(1..)
        .map(|(item, position)| RankedRepository {
            owner: item.owner.login,
            name: item.name,
            position_current: position,
            position_previous: None,
            stars: item.stargazers_count,
            watchers: item.watchers_count,
            forks: item.forks_count,
            open_issues: item.open_issues_count,
            language: item.language,
        })
        .collect()
}

/// Reduce a commit to author name and author timestamp.
///
/// Falls back to the committer timestamp when the author signature is
/// missing. Returns `None` when neither carries a parseable date.
pub fn to_raw_commit(item: CommitItem) -> Option<RawCommit> {
    let author_name = item.commit.author.as_ref().and_then(|a| a.name.clone());
    let date = item
        .commit
        .author
        .and_then(|a| a.date)
        .or_else(|| item.commit.committer.and_then(|c| c.date))?;

    let authored_at = DateTime::parse_from_rfc3339(&date).ok()?;
    Some(RawCommit {
        author_name,
        authored_at,
    })
}

/// Convert a page of commits, skipping records without a usable date.
pub fn to_raw_commits(items: Vec<CommitItem>, repo: &str) -> Vec<RawCommit> {
    let total = items.len();
    let commits: Vec<RawCommit> = items.into_iter().filter_map(to_raw_commit).collect();
    if commits.len() < total {
        tracing::warn!(
            repo = %repo,
            skipped = total - commits.len(),
            "Skipped commits without a usable timestamp"
        );
    }
    commits
}

pub fn to_rate_limits(response: GitHubRateLimitResponse) -> Vec<RateLimitInfo> {
    [
        ("core", response.resources.core),
        ("search", response.resources.search),
    ]
    .into_iter()
    .map(|(resource, r)| RateLimitInfo {
        resource: resource.to_string(),
        limit: r.limit,
        remaining: r.remaining,
        used: r.used,
        reset_at: r.reset_at(),
    })
    .collect()
}
