//! GitHub REST client for the ranking search and commit listing.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::de::DeserializeOwned;

use super::convert::{to_ranking, to_rate_limits, to_raw_commits};
use super::error::{GitHubError, is_rate_limit_error, short_error_message};
use super::types::{CommitItem, GitHubRateLimitResponse, SearchResponse};
use crate::error::CommitWindow;
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpHeaders, HttpRequest, HttpResponse, HttpTransport, header_get};
use crate::platform::{
    self, CommitPage, PlatformClient, RankedRepository, RateLimitInfo, TopQuery,
};
use crate::retry::{RetryConfig, with_retry};
use crate::sync::ProgressCallback;

/// Public GitHub API root.
pub const GITHUB_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = "toprepos";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// GitHub API client.
///
/// Requests are unauthenticated unless a token is given; the search API
/// allows far fewer requests per minute without one.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    api_url: String,
    token: Option<String>,
    retry: RetryConfig,
    progress: Option<Arc<ProgressCallback>>,
}

impl GitHubClient {
    pub fn new(token: Option<&str>, timeout: StdDuration) -> Result<Self, GitHubError> {
        let transport =
            ReqwestTransport::with_timeout(timeout).map_err(|e| GitHubError::Config(e.to_string()))?;
        Ok(Self::new_with_transport(token, Arc::new(transport)))
    }

    pub fn new_with_transport(token: Option<&str>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            api_url: GITHUB_API_URL.to_string(),
            token: token.filter(|t| !t.is_empty()).map(str::to_string),
            retry: RetryConfig::default(),
            progress: None,
        }
    }

    /// Point the client at another API root (GitHub Enterprise).
    #[must_use]
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Report rate-limit backoffs through `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<ProgressCallback>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Extract rate limit info from GitHub response headers.
    pub fn parse_rate_limit_headers(headers: &HttpHeaders) -> Option<RateLimitInfo> {
        let limit = header_get(headers, "x-ratelimit-limit")?
            .parse::<usize>()
            .ok()?;
        let remaining = header_get(headers, "x-ratelimit-remaining")?
            .parse::<usize>()
            .ok()?;
        let used = header_get(headers, "x-ratelimit-used")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or_else(|| limit.saturating_sub(remaining));
        let reset_epoch = header_get(headers, "x-ratelimit-reset")?
            .parse::<i64>()
            .ok()?;
        let reset_at =
            chrono::DateTime::from_timestamp(reset_epoch, 0).unwrap_or_else(chrono::Utc::now);
        let resource = header_get(headers, "x-ratelimit-resource")
            .unwrap_or("core")
            .to_string();
        Some(RateLimitInfo {
            resource,
            limit,
            remaining,
            used,
            reset_at,
        })
    }

    fn request(&self, path: &str, params: &[(&str, String)]) -> Result<HttpRequest, GitHubError> {
        let url = format!("{}{}", self.api_url, path);
        let request = HttpRequest::get(&url, params)
            .map_err(|e| GitHubError::Config(e.to_string()))?
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", USER_AGENT);

        Ok(match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        })
    }

    /// Send one GET and decode the body.
    async fn get<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, GitHubError> {
        let response: HttpResponse = self
            .transport
            .send(request)
            .await
            .map_err(|e| GitHubError::Http(e.to_string()))?;

        if let Some(info) = Self::parse_rate_limit_headers(&response.headers) {
            tracing::trace!(
                resource = %info.resource,
                remaining = info.remaining,
                limit = info.limit,
                "GitHub rate limit"
            );
        }

        if !response.is_success() {
            return Err(GitHubError::from_response(&response));
        }

        serde_json::from_slice(&response.body).map_err(GitHubError::Json)
    }

    /// GET with backoff on rate limiting; other errors return at once.
    async fn get_with_retry<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
        target: &str,
    ) -> Result<T, GitHubError> {
        with_retry(
            || self.get::<T>(request.clone()),
            &self.retry,
            is_rate_limit_error,
            short_error_message,
            target,
            self.progress.as_deref(),
        )
        .await
    }

    pub async fn search_repositories(
        &self,
        query: &TopQuery,
    ) -> Result<Vec<RankedRepository>, GitHubError> {
        let request = self.request(
            "/search/repositories",
            &[
                ("q", query.query.clone()),
                ("sort", query.sort.clone()),
                ("order", query.order.clone()),
                ("per_page", query.per_page.to_string()),
            ],
        )?;

        let response: SearchResponse = self.get_with_retry(request, "search").await?;
        let mut ranking = to_ranking(response.items);
        ranking.truncate(query.per_page as usize);
        tracing::debug!(count = ranking.len(), "Fetched ranking");
        Ok(ranking)
    }

    pub async fn commits_page(
        &self,
        owner: &str,
        repo: &str,
        window: &CommitWindow,
        page: u32,
        per_page: u32,
    ) -> Result<CommitPage, GitHubError> {
        let full_name = format!("{}/{}", owner, repo);
        let request = self.request(
            &format!("/repos/{}/commits", full_name),
            &[
                (
                    "since",
                    window.since().to_rfc3339_opts(SecondsFormat::Secs, true),
                ),
                (
                    "until",
                    window.until().to_rfc3339_opts(SecondsFormat::Secs, true),
                ),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ],
        )?;

        let items: Vec<CommitItem> = self.get_with_retry(request, &full_name).await?;
        let fetched = items.len();
        Ok(CommitPage {
            commits: to_raw_commits(items, &full_name),
            fetched,
        })
    }

    pub async fn rate_limits(&self) -> Result<Vec<RateLimitInfo>, GitHubError> {
        let request = self.request("/rate_limit", &[])?;
        let response: GitHubRateLimitResponse = self.get(request).await?;
        Ok(to_rate_limits(response))
    }
}

#[async_trait]
impl PlatformClient for GitHubClient {
    async fn search_top_repos(&self, query: &TopQuery) -> platform::Result<Vec<RankedRepository>> {
        Ok(self.search_repositories(query).await?)
    }

    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        window: &CommitWindow,
        page: u32,
        per_page: u32,
    ) -> platform::Result<CommitPage> {
        Ok(self
            .commits_page(owner, repo, window, page, per_page)
            .await?)
    }

    async fn get_rate_limits(&self) -> platform::Result<Vec<RateLimitInfo>> {
        Ok(self.rate_limits().await?)
    }
}
