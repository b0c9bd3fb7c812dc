//! GitHub REST payloads, reduced to the fields the sync pipeline reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `GET /search/repositories` response. `items` is required: a body
/// without it is a malformed response, not an empty ranking.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    pub name: String,
    pub owner: Owner,
    pub stargazers_count: i64,
    pub watchers_count: i64,
    pub forks_count: i64,
    pub open_issues_count: i64,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub login: String,
}

/// One element of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitItem {
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub author: Option<Signature>,
    #[serde(default)]
    pub committer: Option<Signature>,
}

/// Git signature; GitHub sends `null` or omits fields on odd commits.
#[derive(Debug, Clone, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitResource {
    pub limit: usize,
    pub used: usize,
    pub remaining: usize,
    /// Unix timestamp when the window resets.
    pub reset: u64,
}

impl RateLimitResource {
    pub fn reset_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.reset as i64, 0).unwrap_or_else(Utc::now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRateLimits {
    /// Non-search REST endpoints, commit listing included.
    pub core: RateLimitResource,
    pub search: RateLimitResource,
}

/// `GET /rate_limit` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRateLimitResponse {
    pub resources: GitHubRateLimits,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_item_null_language() {
        let item: SearchItem = serde_json::from_value(serde_json::json!({
            "name": "awesome",
            "full_name": "sindresorhus/awesome",
            "owner": {"login": "sindresorhus", "id": 170270},
            "stargazers_count": 300000,
            "watchers_count": 300000,
            "forks_count": 28000,
            "open_issues_count": 40,
            "language": null
        }))
        .expect("valid search item");
        assert_eq!(item.language, None);
        assert_eq!(item.owner.login, "sindresorhus");
    }

    #[test]
    fn test_search_response_requires_items() {
        let parsed = serde_json::from_value::<SearchResponse>(serde_json::json!({
            "total_count": 0,
            "incomplete_results": false
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_commit_item_with_null_author() {
        let item: CommitItem = serde_json::from_value(serde_json::json!({
            "sha": "abc",
            "commit": {
                "author": null,
                "committer": {"name": "GitHub", "date": "2024-03-05T10:00:00Z"}
            }
        }))
        .expect("valid commit item");
        assert!(item.commit.author.is_none());
        assert_eq!(
            item.commit.committer.and_then(|c| c.date).as_deref(),
            Some("2024-03-05T10:00:00Z")
        );
    }

    #[test]
    fn test_rate_limit_resource_reset_at() {
        let resource = RateLimitResource {
            limit: 5000,
            used: 10,
            remaining: 4990,
            reset: 1_700_000_000,
        };
        assert_eq!(resource.reset_at().timestamp(), 1_700_000_000);
    }
}
