//! Configuration file support for toprepos.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `TOPREPOS_`, e.g., `TOPREPOS_DATABASE__URL`)
//! 3. Config file (./toprepos.toml, then ~/.config/toprepos/config.toml)
//! 4. Built-in defaults
//!
//! The database URL defaults to `sqlite://~/.local/state/toprepos/toprepos.db` on Linux
//! (using the XDG state directory) if not explicitly configured.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://~/.local/state/toprepos/toprepos.db"  # optional, this is the default
//!
//! [github]
//! token = "ghp_..."  # or use TOPREPOS_GITHUB__TOKEN / GITHUB_TOKEN
//! api_url = "https://api.github.com"
//! timeout_secs = 30
//!
//! [sync]
//! concurrency = 4
//! window_days = 1
//! requests_per_second = 10
//! no_rate_limit = false
//! max_retries = 5
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;
use toprepos::github::{DEFAULT_TIMEOUT, GITHUB_API_URL};
use toprepos::rate_limits;
use toprepos::sync::{DEFAULT_CONCURRENCY, DEFAULT_WINDOW_DAYS, MAX_RATE_LIMIT_RETRIES};

const APP_NAME: &str = "toprepos";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub github: GitHubConfig,
    /// Default sync options.
    pub sync: SyncConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Supports sqlite:// and postgres:// schemes.
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Personal access token. Anonymous requests work but have a far lower quota.
    pub token: Option<String>,
    pub api_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: GITHUB_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Maximum repositories whose activity syncs at once.
    pub concurrency: usize,
    /// Days of commit history per cycle.
    pub window_days: u32,
    /// Proactive request rate.
    pub requests_per_second: u32,
    pub no_rate_limit: bool,
    /// Retries of a rate-limited request.
    pub max_retries: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            window_days: DEFAULT_WINDOW_DAYS,
            requests_per_second: rate_limits::GITHUB_DEFAULT_RPS,
            no_rate_limit: false,
            max_retries: MAX_RATE_LIMIT_RETRIES,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/toprepos/config.toml)
    /// 3. Local config file (./toprepos.toml)
    /// 4. Environment variables with TOPREPOS_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = ProjectDirs::from("", "", APP_NAME) {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        let local_config = PathBuf::from("toprepos.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./toprepos.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // TOPREPOS_SYNC__WINDOW_DAYS -> sync.window_days
        builder = builder.add_source(environment());

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// The `mode=rwc` parameter creates the SQLite file if it doesn't exist.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("toprepos.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// The configured GitHub token, else `GITHUB_TOKEN`.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn github_timeout(&self) -> Duration {
        Duration::from_secs(self.github.timeout_secs.max(1))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/toprepos` or `~/.local/state/toprepos`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}

fn environment() -> Environment {
    Environment::with_prefix("TOPREPOS")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(content: &str) -> Config {
        ConfigBuilder::builder()
            .add_source(config::File::from_str(content, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sync.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.sync.window_days, 1);
        assert_eq!(config.sync.requests_per_second, 10);
        assert_eq!(config.sync.max_retries, 5);
        assert!(!config.sync.no_rate_limit);
        assert!(config.database.url.is_none());
        assert!(config.github.token.is_none());
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.timeout_secs, 30);
    }

    #[test]
    fn test_config_builder_with_toml_string() {
        let config = from_toml(
            r#"
            [database]
            url = "sqlite:///tmp/test.db"

            [github]
            token = "ghp_test123"
            timeout_secs = 5

            [sync]
            concurrency = 8
            window_days = 7
        "#,
        );

        assert_eq!(
            config.database.url,
            Some("sqlite:///tmp/test.db".to_string())
        );
        assert_eq!(config.github.token, Some("ghp_test123".to_string()));
        assert_eq!(config.github_timeout(), Duration::from_secs(5));
        assert_eq!(config.sync.concurrency, 8);
        assert_eq!(config.sync.window_days, 7);
    }

    #[test]
    fn test_config_builder_partial_override() {
        let config = from_toml(
            r#"
            [sync]
            no_rate_limit = true
        "#,
        );

        assert!(config.sync.no_rate_limit);
        assert_eq!(config.sync.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.github.api_url, GITHUB_API_URL);
    }

    #[test]
    fn test_config_merging_order() {
        let settings = ConfigBuilder::builder()
            .add_source(config::File::from_str(
                "[sync]\nconcurrency = 2\nwindow_days = 3",
                FileFormat::Toml,
            ))
            .add_source(config::File::from_str(
                "[sync]\nwindow_days = 9",
                FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let config: Config = settings.try_deserialize().unwrap();

        assert_eq!(config.sync.window_days, 9);
        assert_eq!(config.sync.concurrency, 2);
    }

    #[test]
    fn test_environment_source_maps_nested_keys() {
        let source = environment().source(Some(
            [
                ("TOPREPOS_SYNC__WINDOW_DAYS".to_string(), "14".to_string()),
                ("TOPREPOS_GITHUB__TOKEN".to_string(), "ghp_env".to_string()),
            ]
            .into_iter()
            .collect(),
        ));

        let config: Config = ConfigBuilder::builder()
            .add_source(source)
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.sync.window_days, 14);
        assert_eq!(config.github.token, Some("ghp_env".to_string()));
    }

    #[test]
    fn test_config_invalid_toml() {
        let result = ConfigBuilder::builder()
            .add_source(config::File::from_str(
                "[sync\nconcurrency = 4",
                FileFormat::Toml,
            ))
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_database_url_defaults_to_state_dir() {
        let url = Config::default()
            .database_url()
            .expect("a default database URL");
        assert!(url.starts_with("sqlite://"));
        assert!(url.contains("toprepos.db"));
        assert!(url.ends_with("?mode=rwc"));
    }

    #[test]
    fn test_database_url_respects_configured_value() {
        let config = from_toml(
            r#"
            [database]
            url = "postgres://localhost/toprepos"
        "#,
        );

        assert_eq!(
            config.database_url(),
            Some("postgres://localhost/toprepos".to_string())
        );
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let config = from_toml(
            r#"
            [github]
            token = "   "
        "#,
        );
        // GITHUB_TOKEN may be set in the environment; a blank configured token never wins.
        assert_ne!(config.github_token(), Some("   ".to_string()));
    }

    #[test]
    fn test_zero_timeout_is_clamped() {
        let config = from_toml("[github]\ntimeout_secs = 0");
        assert_eq!(config.github_timeout(), Duration::from_secs(1));
    }
}
