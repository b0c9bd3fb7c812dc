use chrono::NaiveDate;
use serde::Serialize;
use tabled::Tabled;
use toprepos::DailyActivityModel;
use toprepos::db;
use toprepos::store;

use crate::commands::shared::{OutputFormat, print_rows};

/// One stored day.
#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct ActivityRow {
    #[tabled(rename = "Date")]
    pub date: NaiveDate,
    #[tabled(rename = "Commits")]
    pub commits: i32,
    #[tabled(rename = "Authors")]
    #[tabled(display_with = "display_authors")]
    pub authors: Vec<String>,
}

fn display_authors(authors: &[String]) -> String {
    authors.join(", ")
}

impl From<DailyActivityModel> for ActivityRow {
    fn from(model: DailyActivityModel) -> Self {
        Self {
            date: model.date,
            commits: model.commits,
            authors: model.author_names(),
        }
    }
}

pub(crate) async fn handle_activity(
    owner: &str,
    repo: &str,
    since: NaiveDate,
    until: NaiveDate,
    output: OutputFormat,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect_and_migrate(database_url).await?;
    let days = store::activity_in_range(&db, owner, repo, since, until).await?;

    if days.is_empty() {
        if matches!(output, OutputFormat::Table) {
            println!(
                "No activity stored for {}/{} between {} and {}.",
                owner, repo, since, until
            );
        } else {
            println!("[]");
        }
        return Ok(());
    }

    let total: i64 = days.iter().map(|d| i64::from(d.commits)).sum();
    print_rows(days.into_iter().map(ActivityRow::from).collect(), output)?;
    if matches!(output, OutputFormat::Table) {
        println!("{} commits in total.", total);
    }
    Ok(())
}
