//! GitHub API error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::http::HttpResponse;
use crate::platform::ProviderError;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limit exceeded. Resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GitHubError {
    /// Classify a non-2xx response.
    ///
    /// GitHub signals primary rate limiting with 403 plus
    /// `x-ratelimit-remaining: 0`, and secondary limits with 429.
    pub(crate) fn from_response(response: &HttpResponse) -> Self {
        let exhausted = response.header("x-ratelimit-remaining") == Some("0");
        if response.status == 429 || (response.status == 403 && exhausted) {
            let reset_at = response
                .header("x-ratelimit-reset")
                .and_then(|v| v.parse::<i64>().ok())
                .and_then(|epoch| DateTime::from_timestamp(epoch, 0))
                .unwrap_or_else(|| Utc::now() + chrono::Duration::minutes(1));
            return GitHubError::RateLimited { reset_at };
        }

        GitHubError::Api {
            status: response.status,
            message: response.text(),
        }
    }
}

impl From<GitHubError> for ProviderError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::Http(message) => ProviderError::Network { message },
            GitHubError::Json(e) => ProviderError::Malformed {
                message: e.to_string(),
            },
            GitHubError::Api { status, message } => match status {
                401 | 403 => ProviderError::AuthRequired,
                404 => ProviderError::NotFound { resource: message },
                _ => ProviderError::Api { status, message },
            },
            GitHubError::RateLimited { reset_at } => ProviderError::RateLimited { reset_at },
            GitHubError::Config(message) => ProviderError::Internal { message },
        }
    }
}

pub fn is_rate_limit_error(err: &GitHubError) -> bool {
    matches!(err, GitHubError::RateLimited { .. })
}

/// Get a short error message suitable for display.
pub fn short_error_message(err: &GitHubError) -> String {
    match err {
        GitHubError::Http(_) => "Network error".to_string(),
        GitHubError::Json(_) => "JSON parse error".to_string(),
        GitHubError::Api { status, message } => {
            if message.chars().count() > 50 {
                let truncated: String = message.chars().take(47).collect();
                format!("HTTP {}: {}...", status, truncated)
            } else {
                format!("HTTP {}: {}", status, message)
            }
        }
        GitHubError::RateLimited { .. } => "Rate limited".to_string(),
        GitHubError::Config(msg) => format!("Config: {}", msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, headers: Vec<(&str, &str)>) -> HttpResponse {
        HttpResponse {
            status,
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: b"{\"message\":\"nope\"}".to_vec(),
        }
    }

    #[test]
    fn test_from_response_403_with_exhausted_quota_is_rate_limited() {
        let err = GitHubError::from_response(&response(
            403,
            vec![
                ("X-RateLimit-Remaining", "0"),
                ("X-RateLimit-Reset", "1700000000"),
            ],
        ));
        match err {
            GitHubError::RateLimited { reset_at } => {
                assert_eq!(reset_at.timestamp(), 1_700_000_000);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_response_429_without_reset_uses_fallback() {
        let before = Utc::now();
        let err = GitHubError::from_response(&response(429, vec![]));
        match err {
            GitHubError::RateLimited { reset_at } => assert!(reset_at > before),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_response_plain_403_is_api_error() {
        let err = GitHubError::from_response(&response(403, vec![("X-RateLimit-Remaining", "12")]));
        assert!(matches!(err, GitHubError::Api { status: 403, .. }));
        assert!(!is_rate_limit_error(&err));
    }

    #[test]
    fn test_github_error_to_provider_error() {
        let not_found: ProviderError = GitHubError::Api {
            status: 404,
            message: "Not Found".to_string(),
        }
        .into();
        assert!(matches!(not_found, ProviderError::NotFound { .. }));

        let auth: ProviderError = GitHubError::Api {
            status: 401,
            message: "Bad credentials".to_string(),
        }
        .into();
        assert!(matches!(auth, ProviderError::AuthRequired));

        let server: ProviderError = GitHubError::Api {
            status: 502,
            message: "Bad Gateway".to_string(),
        }
        .into();
        assert!(matches!(server, ProviderError::Api { status: 502, .. }));

        let json_err = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        let malformed: ProviderError = GitHubError::Json(json_err).into();
        assert!(matches!(malformed, ProviderError::Malformed { .. }));

        let limited: ProviderError = GitHubError::RateLimited {
            reset_at: Utc::now(),
        }
        .into();
        assert!(limited.is_rate_limited());
    }

    #[test]
    fn test_short_error_message() {
        let err = GitHubError::RateLimited {
            reset_at: Utc::now(),
        };
        assert_eq!(short_error_message(&err), "Rate limited");

        let long = GitHubError::Api {
            status: 500,
            message: "x".repeat(80),
        };
        let short = short_error_message(&long);
        assert!(short.starts_with("HTTP 500: "));
        assert!(short.ends_with("..."));
    }
}
