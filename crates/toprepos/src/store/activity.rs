use std::collections::BTreeSet;

use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::OnConflict,
};

use crate::entity::daily_activity::{ActiveModel, Column, Entity as DailyActivity, Model};
use crate::error::DateRange;

use super::errors::{PersistenceError, Result};

/// Write one day's activity for `owner/repo`, replacing any earlier record
/// for that day.
pub async fn upsert_day(
    db: &DatabaseConnection,
    owner: &str,
    repo: &str,
    date: NaiveDate,
    commits: usize,
    authors: &BTreeSet<String>,
) -> Result<()> {
    let commits = i32::try_from(commits).map_err(|_| {
        PersistenceError::invalid_input(format!(
            "{commits} commits on {date} for {owner}/{repo} exceeds the column range"
        ))
    })?;

    let model = ActiveModel {
        owner: Set(owner.to_string()),
        repo: Set(repo.to_string()),
        date: Set(date),
        commits: Set(commits),
        authors: Set(serde_json::Value::from(
            authors.iter().cloned().collect::<Vec<_>>(),
        )),
    };

    DailyActivity::insert(model)
        .on_conflict(build_activity_on_conflict())
        .exec_without_returning(db)
        .await?;
    Ok(())
}

pub(crate) fn build_activity_on_conflict() -> OnConflict {
    OnConflict::columns([Column::Owner, Column::Repo, Column::Date])
        .update_columns([Column::Commits, Column::Authors])
        .to_owned()
}

/// Stored days of `owner/repo` inside `range` (both ends inclusive), oldest
/// first.
pub async fn between(
    db: &DatabaseConnection,
    owner: &str,
    repo: &str,
    range: &DateRange,
) -> Result<Vec<Model>> {
    Ok(DailyActivity::find()
        .filter(Column::Owner.eq(owner))
        .filter(Column::Repo.eq(repo))
        .filter(Column::Date.between(range.since(), range.until()))
        .order_by_asc(Column::Date)
        .all(db)
        .await?)
}

/// Validate `since..=until` and load the matching days.
///
/// An inverted range fails before the store is touched.
pub async fn activity_in_range(
    db: &DatabaseConnection,
    owner: &str,
    repo: &str,
    since: NaiveDate,
    until: NaiveDate,
) -> crate::Result<Vec<Model>> {
    let range = DateRange::new(since, until)?;
    Ok(between(db, owner, repo, &range).await?)
}
