//! TopRepository entity - one row per repository in the current ranking.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "top_repositories")]
pub struct Model {
    /// `owner/name`, the reconciliation key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub full_name: String,

    // ─── Naming ──────────────────────────────────────────────────────────────
    pub owner: String,
    pub name: String,

    // ─── Ranking ─────────────────────────────────────────────────────────────
    /// 1-based position in the latest ranking.
    pub position_current: i32,
    /// Position in the ranking before the latest one; `None` for newcomers.
    pub position_previous: Option<i32>,

    // ─── Statistics ──────────────────────────────────────────────────────────
    pub stars: i64,
    pub watchers: i64,
    pub forks: i64,
    pub open_issues: i64,
    pub language: Option<String>,

    // ─── Tracking ────────────────────────────────────────────────────────────
    /// When the latest reconciliation wrote this row.
    pub synced_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Places gained since the previous ranking (negative when the
    /// repository dropped). `None` for newcomers.
    pub fn rank_change(&self) -> Option<i32> {
        self.position_previous
            .map(|previous| previous - self.position_current)
    }
}
