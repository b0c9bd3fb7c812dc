use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

use crate::error::CommitWindow;

use super::errors::Result;
use super::types::{CommitPage, PlatformClient, RankedRepository, RateLimitInfo, TopQuery};

type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Default proactive limits (requests per second).
pub mod rate_limits {
    /// GitHub: 5000 requests/hour authenticated; 10/sec still allows bursts.
    pub const GITHUB_DEFAULT_RPS: u32 = 10;
}

/// A shared requests-per-second gate.
///
/// Clones share one bucket, so every task of a batch draws from the same quota.
#[derive(Clone)]
pub struct ApiRateLimiter {
    inner: Arc<GovernorRateLimiter>,
}

impl ApiRateLimiter {
    /// `requests_per_second` of 0 is treated as 1.
    pub fn new(requests_per_second: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            inner: Arc::new(RateLimiter::direct(Quota::per_second(rps))),
        }
    }

    /// Wait until the limiter lets another request through.
    pub async fn wait(&self) {
        self.inner.until_ready().await;
    }
}

/// A rate-limited wrapper around any `PlatformClient`.
///
/// Every trait call waits on the limiter before delegating, which keeps
/// concurrent activity syncs under the provider's quota.
///
/// ```ignore
/// use toprepos::platform::{RateLimitedClient, rate_limits};
/// use toprepos::github::GitHubClient;
///
/// let client = RateLimitedClient::new(GitHubClient::new(Some(&token))?, rate_limits::GITHUB_DEFAULT_RPS);
/// ```
pub struct RateLimitedClient<C> {
    inner: C,
    limiter: ApiRateLimiter,
}

impl<C> RateLimitedClient<C> {
    pub fn new(inner: C, requests_per_second: u32) -> Self {
        Self::with_limiter(inner, ApiRateLimiter::new(requests_per_second))
    }

    /// Wrap `inner` with an existing (possibly shared) limiter.
    pub fn with_limiter(inner: C, limiter: ApiRateLimiter) -> Self {
        Self { inner, limiter }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: Clone> Clone for RateLimitedClient<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            limiter: self.limiter.clone(),
        }
    }
}

#[async_trait]
impl<C: PlatformClient> PlatformClient for RateLimitedClient<C> {
    async fn search_top_repos(&self, query: &TopQuery) -> Result<Vec<RankedRepository>> {
        self.limiter.wait().await;
        self.inner.search_top_repos(query).await
    }

    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        window: &CommitWindow,
        page: u32,
        per_page: u32,
    ) -> Result<CommitPage> {
        self.limiter.wait().await;
        self.inner
            .list_commits(owner, repo, window, page, per_page)
            .await
    }

    async fn get_rate_limits(&self) -> Result<Vec<RateLimitInfo>> {
        self.limiter.wait().await;
        self.inner.get_rate_limits().await
    }
}
