use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, OnConflict},
};

use crate::entity::top_repository::{ActiveModel, Column, Entity as TopRepository, Model};
use crate::platform::RankedRepository;

use super::errors::Result;

/// Most rows any ranking listing returns.
pub const MAX_LISTED: u64 = 100;

/// What a reconciliation changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankingOutcome {
    /// Rows created for repositories new to the ranking.
    pub added: u64,
    /// Rows that existed and had their history shifted.
    pub updated: u64,
    /// Rows deleted because the repository left the ranking.
    pub removed: u64,
}

// ─── Reconciliation ──────────────────────────────────────────────────────────

/// Replace the stored ranking with `fresh`.
///
/// Rows missing from `fresh` are deleted first. Every remaining record is
/// then upserted in order; for rows that already existed the old current
/// position moves into `position_previous`. When `fresh` names the same
/// repository more than once, the last occurrence is the one stored.
///
/// Statements are not wrapped in a transaction: on error, whatever already
/// ran stays applied and the error is returned.
pub async fn reconcile(db: &DatabaseConnection, fresh: &[RankedRepository]) -> Result<RankingOutcome> {
    let fresh = last_occurrences(fresh);
    let keep: Vec<String> = fresh.iter().map(|r| r.full_name()).collect();

    let existing: HashSet<String> = TopRepository::find()
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.full_name)
        .collect();

    let removed = if keep.is_empty() {
        tracing::warn!(
            existing = existing.len(),
            "Empty ranking, clearing every stored repository"
        );
        TopRepository::delete_many().exec(db).await?.rows_affected
    } else {
        TopRepository::delete_many()
            .filter(Column::FullName.is_not_in(keep.iter().cloned()))
            .exec(db)
            .await?
            .rows_affected
    };

    let synced_at = Utc::now().fixed_offset();
    let mut outcome = RankingOutcome {
        removed,
        ..Default::default()
    };

    for repo in fresh {
        let full_name = repo.full_name();
        TopRepository::insert(to_active_model(repo, synced_at))
            .on_conflict(build_ranking_on_conflict())
            .exec_without_returning(db)
            .await?;

        if existing.contains(&full_name) {
            outcome.updated += 1;
        } else {
            outcome.added += 1;
        }
    }

    tracing::debug!(
        added = outcome.added,
        updated = outcome.updated,
        removed = outcome.removed,
        "Ranking reconciled"
    );

    Ok(outcome)
}

/// Drop earlier duplicates, keeping each name at its last position in input
/// order.
fn last_occurrences(fresh: &[RankedRepository]) -> Vec<&RankedRepository> {
    let last_index: HashMap<String, usize> = fresh
        .iter()
        .enumerate()
        .map(|(i, r)| (r.full_name(), i))
        .collect();

    fresh
        .iter()
        .enumerate()
        .filter(|(i, r)| last_index.get(&r.full_name()) == Some(i))
        .map(|(_, r)| r)
        .collect()
}

fn to_active_model(
    repo: &RankedRepository,
    synced_at: chrono::DateTime<chrono::FixedOffset>,
) -> ActiveModel {
    ActiveModel {
        full_name: Set(repo.full_name()),
        owner: Set(repo.owner.clone()),
        name: Set(repo.name.clone()),
        position_current: Set(repo.position_current),
        position_previous: Set(None),
        stars: Set(repo.stars),
        watchers: Set(repo.watchers),
        forks: Set(repo.forks),
        open_issues: Set(repo.open_issues),
        language: Set(repo.language.clone()),
        synced_at: Set(synced_at),
    }
}

/// ON CONFLICT clause for the ranking upsert.
///
/// `position_previous` takes the stored row's `position_current`; every other
/// column takes the incoming value.
pub(crate) fn build_ranking_on_conflict() -> OnConflict {
    OnConflict::column(Column::FullName)
        .value(
            Column::PositionPrevious,
            Expr::col((TopRepository, Column::PositionCurrent)),
        )
        .update_columns([
            Column::Owner,
            Column::Name,
            Column::PositionCurrent,
            Column::Stars,
            Column::Watchers,
            Column::Forks,
            Column::OpenIssues,
            Column::Language,
            Column::SyncedAt,
        ])
        .to_owned()
}

// ─── Queries ─────────────────────────────────────────────────────────────────

/// `(owner, name)` of every stored repository, best ranked first.
pub async fn tracked(db: &DatabaseConnection) -> Result<Vec<(String, String)>> {
    let rows = TopRepository::find()
        .order_by_asc(Column::PositionCurrent)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|m| (m.owner, m.name)).collect())
}

/// Column a ranking listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Stars,
    Watchers,
    Forks,
    OpenIssues,
}

impl SortKey {
    fn column(self) -> Column {
        match self {
            SortKey::Stars => Column::Stars,
            SortKey::Watchers => Column::Watchers,
            SortKey::Forks => Column::Forks,
            SortKey::OpenIssues => Column::OpenIssues,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Stored ranking ordered by `key`, ties broken by current position.
pub async fn list_sorted(
    db: &DatabaseConnection,
    key: SortKey,
    direction: SortDirection,
) -> Result<Vec<Model>> {
    let query = TopRepository::find();
    let query = match direction {
        SortDirection::Asc => query.order_by_asc(key.column()),
        SortDirection::Desc => query.order_by_desc(key.column()),
    };

    Ok(query
        .order_by_asc(Column::PositionCurrent)
        .limit(MAX_LISTED)
        .all(db)
        .await?)
}
