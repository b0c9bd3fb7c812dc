//! Page-by-page commit retrieval.
//!
//! [`CommitPager`] issues one `list_commits` request per [`CommitPager::next_page`]
//! call, starting at page 1, and stops after the first empty or short page.
//! Whether a page is short is judged on the items the provider sent, so
//! records dropped during conversion never end the walk early.
//! [`collect_commits`] drains a pager with the batch job's failure policy: any
//! page error drops everything fetched for that repository.

use crate::error::CommitWindow;
use crate::sync::{ProgressCallback, SyncProgress, emit};

use super::errors::{Result, short_error_message};
use super::types::{CommitPage, PAGE_SIZE, PlatformClient, RawCommit};

/// Lazy, finite walk over a repository's commit pages.
///
/// A pager is single-use: once exhausted (or failed) it yields nothing more.
/// Fetching again means building a new pager, which starts over at page 1.
pub struct CommitPager<'a, C: ?Sized> {
    client: &'a C,
    owner: &'a str,
    repo: &'a str,
    window: CommitWindow,
    per_page: u32,
    next: u32,
    requests: u32,
    exhausted: bool,
}

impl<'a, C: PlatformClient + ?Sized> CommitPager<'a, C> {
    pub fn new(client: &'a C, owner: &'a str, repo: &'a str, window: CommitWindow) -> Self {
        Self {
            client,
            owner,
            repo,
            window,
            per_page: PAGE_SIZE,
            next: 1,
            requests: 0,
            exhausted: false,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Number of page requests issued so far.
    pub fn requests(&self) -> u32 {
        self.requests
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Fetch the next page.
    ///
    /// Returns `None` once the stream has ended. A full page may still yield
    /// an empty list when none of its items converted. An error ends the
    /// stream too; it is returned once and the pager is exhausted afterwards.
    pub async fn next_page(&mut self) -> Option<Result<Vec<RawCommit>>> {
        if self.exhausted {
            return None;
        }

        let page = self.next;
        self.requests += 1;

        match self
            .client
            .list_commits(self.owner, self.repo, &self.window, page, self.per_page)
            .await
        {
            Ok(CommitPage { commits, fetched }) => {
                self.next += 1;
                if fetched < self.per_page as usize {
                    self.exhausted = true;
                }
                tracing::debug!(
                    repo = %format!("{}/{}", self.owner, self.repo),
                    page,
                    fetched,
                    kept = commits.len(),
                    "Fetched commit page"
                );
                if fetched == 0 {
                    None
                } else {
                    Some(Ok(commits))
                }
            }
            Err(e) => {
                self.exhausted = true;
                Some(Err(e))
            }
        }
    }
}

/// Outcome of draining a pager.
#[derive(Debug, Default)]
pub struct CommitFetch {
    /// Every commit in the window, or nothing if the fetch was degraded.
    pub commits: Vec<RawCommit>,
    /// Page requests made, including the one that failed.
    pub requests: u32,
    /// A page request failed and the partial result was discarded.
    pub degraded: bool,
}

/// Fetch all commits for `owner/repo` inside `window`, best effort.
///
/// A provider error on any page aborts the walk, is logged and reported as
/// [`SyncProgress::ActivityFetchFailed`], and yields an empty commit list.
/// `window` is trusted to be ordered; it is not validated here.
pub async fn collect_commits<C: PlatformClient + ?Sized>(
    client: &C,
    owner: &str,
    repo: &str,
    window: &CommitWindow,
    on_progress: Option<&ProgressCallback>,
) -> CommitFetch {
    let mut pager = CommitPager::new(client, owner, repo, *window);
    let mut commits = Vec::new();

    while let Some(page) = pager.next_page().await {
        match page {
            Ok(batch) => commits.extend(batch),
            Err(e) => {
                let error = short_error_message(&e);
                tracing::warn!(
                    repo = %format!("{}/{}", owner, repo),
                    page = pager.requests(),
                    error = %error,
                    "Commit fetch failed, recording no activity for this cycle"
                );
                emit(
                    on_progress,
                    SyncProgress::ActivityFetchFailed {
                        owner: owner.to_string(),
                        name: repo.to_string(),
                        error,
                    },
                );
                return CommitFetch {
                    commits: Vec::new(),
                    requests: pager.requests(),
                    degraded: true,
                };
            }
        }
    }

    CommitFetch {
        commits,
        requests: pager.requests(),
        degraded: false,
    }
}
