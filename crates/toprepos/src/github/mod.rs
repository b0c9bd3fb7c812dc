//! GitHub implementation of [`crate::platform::PlatformClient`].
//!
//! # Module Structure
//!
//! - [`error`] - GitHub error type and its mapping to `ProviderError`
//! - [`types`] - REST payloads
//! - [`convert`] - payload to ranking/commit conversion
//! - [`client`] - the HTTP client
//!
//! ```ignore
//! use toprepos::github::GitHubClient;
//! use toprepos::platform::{RateLimitedClient, rate_limits};
//!
//! let client = GitHubClient::new(Some(&token), DEFAULT_TIMEOUT)?;
//! let client = RateLimitedClient::new(client, rate_limits::GITHUB_DEFAULT_RPS);
//! ```

mod client;
mod convert;
mod error;
mod types;

pub use client::{DEFAULT_TIMEOUT, GITHUB_API_URL, GitHubClient};
pub use error::{GitHubError, is_rate_limit_error, short_error_message};
pub use types::{GitHubRateLimitResponse, GitHubRateLimits, RateLimitResource};
