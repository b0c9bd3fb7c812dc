//! Scriptable in-memory provider for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;

use crate::error::CommitWindow;

use super::errors::{ProviderError, Result};
use super::types::{
    CommitPage, PlatformClient, RankedRepository, RateLimitInfo, RawCommit, TopQuery,
};

/// What the fake returns for one commit page.
#[derive(Debug, Clone)]
pub(crate) enum PageScript {
    Commits(Vec<RawCommit>),
    /// A page of `fetched` items of which only `commits` converted.
    Partial {
        commits: Vec<RawCommit>,
        fetched: usize,
    },
    Fail,
}

#[derive(Default)]
struct FakeState {
    ranking: Option<Vec<RankedRepository>>,
    pages: HashMap<String, Vec<PageScript>>,
    commit_calls: Vec<(String, u32)>,
    last_per_page: Option<u32>,
    search_calls: usize,
    page_delay: Option<Duration>,
    in_flight: usize,
    peak_in_flight: usize,
}

/// A provider whose answers are fixed up front.
///
/// Unscripted repositories answer every page with an empty list. Without a
/// ranking, `search_top_repos` fails.
#[derive(Clone, Default)]
pub(crate) struct FakeProvider {
    state: Arc<Mutex<FakeState>>,
}

impl FakeProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn with_ranking(self, ranking: Vec<RankedRepository>) -> Self {
        self.lock().ranking = Some(ranking);
        self
    }

    pub(crate) fn with_pages(self, full_name: &str, pages: Vec<PageScript>) -> Self {
        self.lock().pages.insert(full_name.to_string(), pages);
        self
    }

    /// Hold every commit page request open for `delay`.
    pub(crate) fn with_page_delay(self, delay: Duration) -> Self {
        self.lock().page_delay = Some(delay);
        self
    }

    /// Most commit page requests ever open at the same time.
    pub(crate) fn peak_in_flight(&self) -> usize {
        self.lock().peak_in_flight
    }

    pub(crate) fn commit_calls(&self) -> Vec<(String, u32)> {
        self.lock().commit_calls.clone()
    }

    pub(crate) fn last_per_page(&self) -> Option<u32> {
        self.lock().last_per_page
    }

    pub(crate) fn search_calls(&self) -> usize {
        self.lock().search_calls
    }
}

#[async_trait]
impl PlatformClient for FakeProvider {
    async fn search_top_repos(&self, _query: &TopQuery) -> Result<Vec<RankedRepository>> {
        let mut state = self.lock();
        state.search_calls += 1;
        state
            .ranking
            .clone()
            .ok_or_else(|| ProviderError::network("search unavailable"))
    }

    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        _window: &CommitWindow,
        page: u32,
        per_page: u32,
    ) -> Result<CommitPage> {
        let full_name = format!("{owner}/{repo}");
        let (script, delay) = {
            let mut state = self.lock();
            state.commit_calls.push((full_name.clone(), page));
            state.last_per_page = Some(per_page);
            state.in_flight += 1;
            state.peak_in_flight = state.peak_in_flight.max(state.in_flight);

            let script = state
                .pages
                .get(&full_name)
                .and_then(|pages| pages.get(page as usize - 1))
                .cloned();
            (script, state.page_delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.lock().in_flight -= 1;

        match script {
            Some(PageScript::Commits(commits)) => Ok(CommitPage::complete(commits)),
            Some(PageScript::Partial { commits, fetched }) => Ok(CommitPage { commits, fetched }),
            Some(PageScript::Fail) => Err(ProviderError::api(502, "bad gateway")),
            None => Ok(CommitPage::default()),
        }
    }

    async fn get_rate_limits(&self) -> Result<Vec<RateLimitInfo>> {
        Ok(Vec::new())
    }
}

/// A commit by `author` at an RFC 3339 timestamp.
pub(crate) fn commit(author: Option<&str>, timestamp: &str) -> RawCommit {
    RawCommit {
        author_name: author.map(str::to_string),
        authored_at: DateTime::parse_from_rfc3339(timestamp).expect("valid test timestamp"),
    }
}

/// `count` attributed commits sharing one timestamp.
pub(crate) fn commits_on(timestamp: &str, count: usize) -> Vec<RawCommit> {
    (0..count)
        .map(|i| commit(Some(&format!("dev-{}", i % 7)), timestamp))
        .collect()
}

pub(crate) fn ranked(owner: &str, name: &str, position: i32, stars: i64) -> RankedRepository {
    RankedRepository {
        owner: owner.to_string(),
        name: name.to_string(),
        position_current: position,
        position_previous: None,
        stars,
        watchers: stars,
        forks: stars / 10,
        open_issues: 3,
        language: Some("Rust".to_string()),
    }
}
