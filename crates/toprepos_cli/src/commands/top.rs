use clap::ValueEnum;
use serde::Serialize;
use tabled::Tabled;
use toprepos::TopRepositoryModel;
use toprepos::db;
use toprepos::store::{self, SortDirection, SortKey};

use crate::commands::shared::{OutputFormat, print_rows};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum SortKeyArg {
    #[default]
    Stars,
    Watchers,
    Forks,
    OpenIssues,
}

impl From<SortKeyArg> for SortKey {
    fn from(arg: SortKeyArg) -> Self {
        match arg {
            SortKeyArg::Stars => SortKey::Stars,
            SortKeyArg::Watchers => SortKey::Watchers,
            SortKeyArg::Forks => SortKey::Forks,
            SortKeyArg::OpenIssues => SortKey::OpenIssues,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum SortDirectionArg {
    Asc,
    #[default]
    Desc,
}

impl From<SortDirectionArg> for SortDirection {
    fn from(arg: SortDirectionArg) -> Self {
        match arg {
            SortDirectionArg::Asc => SortDirection::Asc,
            SortDirectionArg::Desc => SortDirection::Desc,
        }
    }
}

/// One leaderboard line.
#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct TopRow {
    #[tabled(rename = "#")]
    pub position: i32,
    #[tabled(rename = "Change")]
    pub change: String,
    #[tabled(rename = "Repository")]
    pub full_name: String,
    #[tabled(rename = "Stars")]
    pub stars: i64,
    #[tabled(rename = "Watchers")]
    pub watchers: i64,
    #[tabled(rename = "Forks")]
    pub forks: i64,
    #[tabled(rename = "Issues")]
    pub open_issues: i64,
    #[tabled(rename = "Language")]
    pub language: String,
}

impl From<TopRepositoryModel> for TopRow {
    fn from(model: TopRepositoryModel) -> Self {
        Self {
            position: model.position_current,
            change: format_change(model.rank_change()),
            full_name: model.full_name,
            stars: model.stars,
            watchers: model.watchers,
            forks: model.forks,
            open_issues: model.open_issues,
            language: model.language.unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// `▲3` for a climb, `▼2` for a drop, `=` for no move, `new` without history.
fn format_change(change: Option<i32>) -> String {
    match change {
        None => "new".to_string(),
        Some(0) => "=".to_string(),
        Some(n) if n > 0 => format!("▲{}", n),
        Some(n) => format!("▼{}", -n),
    }
}

pub(crate) async fn handle_top(
    sort_by: SortKeyArg,
    order: SortDirectionArg,
    output: OutputFormat,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect_and_migrate(database_url).await?;
    let rows = store::list_sorted(&db, sort_by.into(), order.into()).await?;

    if rows.is_empty() && matches!(output, OutputFormat::Table) {
        println!("No repositories stored yet. Run `toprepos sync` first.");
        return Ok(());
    }

    print_rows(rows.into_iter().map(TopRow::from).collect(), output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn format_change_marks_direction() {
        assert_eq!(format_change(None), "new");
        assert_eq!(format_change(Some(0)), "=");
        assert_eq!(format_change(Some(3)), "▲3");
        assert_eq!(format_change(Some(-2)), "▼2");
    }

    #[test]
    fn top_row_from_model() {
        let row = TopRow::from(TopRepositoryModel {
            full_name: "acme/rocket".to_string(),
            owner: "acme".to_string(),
            name: "rocket".to_string(),
            position_current: 4,
            position_previous: Some(7),
            stars: 120_000,
            watchers: 120_000,
            forks: 9_000,
            open_issues: 12,
            language: None,
            synced_at: Utc::now().fixed_offset(),
        });

        assert_eq!(row.position, 4);
        assert_eq!(row.change, "▲3");
        assert_eq!(row.language, "-");
    }

    #[test]
    fn sort_args_map_to_store_keys() {
        assert_eq!(SortKey::from(SortKeyArg::OpenIssues), SortKey::OpenIssues);
        assert_eq!(SortDirection::from(SortDirectionArg::Asc), SortDirection::Asc);
        assert_eq!(
            SortKeyArg::from_str("open-issues", true).ok().map(SortKey::from),
            Some(SortKey::OpenIssues)
        );
    }
}
