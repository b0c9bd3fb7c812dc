use serde::Serialize;
use tabled::Tabled;
use toprepos::PlatformClient;
use toprepos::github::GitHubClient;
use toprepos::platform::RateLimitInfo;

use crate::commands::shared::{OutputFormat, print_rows};
use crate::config::Config;

/// Show GitHub rate limit status. Needs no database.
pub(crate) async fn handle_limits(
    output: OutputFormat,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let token = config.github_token();
    let client = GitHubClient::new(token.as_deref(), config.github_timeout())?
        .with_api_url(&config.github.api_url);

    let limits = client.get_rate_limits().await?;
    let items = limits.iter().map(RateLimitDisplay::from_info).collect();
    RateLimitDisplay::print_many(items, output)?;

    if !client.is_authenticated() && matches!(output, OutputFormat::Table) {
        println!("Anonymous quota; set TOPREPOS_GITHUB__TOKEN or GITHUB_TOKEN for more.");
    }

    Ok(())
}

/// Rate limit information for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct RateLimitDisplay {
    #[tabled(rename = "Resource")]
    pub resource: String,
    #[tabled(rename = "Limit")]
    pub limit: String,
    #[tabled(rename = "Used")]
    pub used: String,
    #[tabled(rename = "Remaining")]
    pub remaining: String,
    #[tabled(rename = "Usage %")]
    pub usage_percent: String,
    #[tabled(rename = "Resets At")]
    pub reset_at: String,
    #[tabled(rename = "Resets In")]
    pub reset_in: String,
}

impl RateLimitDisplay {
    pub(crate) fn from_info(info: &RateLimitInfo) -> Self {
        let usage_percent = if info.limit > 0 {
            (info.used as f64 / info.limit as f64) * 100.0
        } else {
            0.0
        };
        let reset_duration = info.reset_at.signed_duration_since(chrono::Utc::now());
        let reset_in = if reset_duration.num_seconds() > 0 {
            format_duration(reset_duration)
        } else {
            "now".to_string()
        };

        Self {
            resource: info.resource.clone(),
            limit: info.limit.to_string(),
            used: info.used.to_string(),
            remaining: info.remaining.to_string(),
            usage_percent: format!("{:.1}%", usage_percent),
            reset_at: info.reset_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            reset_in,
        }
    }

    pub(crate) fn print_many(
        mut items: Vec<Self>,
        format: OutputFormat,
    ) -> Result<(), serde_json::Error> {
        // Sort by resource name for consistent output
        items.sort_by(|a, b| a.resource.cmp(&b.resource));
        print_rows(items, format)
    }
}

/// Format a duration in a human-readable way.
fn format_duration(duration: chrono::Duration) -> String {
    let total_secs = duration.num_seconds();
    if total_secs < 60 {
        format!("{}s", total_secs)
    } else if total_secs < 3600 {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        if secs > 0 {
            format!("{}m {}s", mins, secs)
        } else {
            format!("{}m", mins)
        }
    } else {
        let hours = total_secs / 3600;
        let mins = (total_secs % 3600) / 60;
        if mins > 0 {
            format!("{}h {}m", hours, mins)
        } else {
            format!("{}h", hours)
        }
    }
}
