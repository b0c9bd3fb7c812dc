//! DailyActivity entity - commit count and authors per repository per day.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_activity")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub owner: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub repo: String,
    /// Calendar day in the commits' own offset.
    #[sea_orm(primary_key, auto_increment = false)]
    pub date: Date,

    pub commits: i32,
    /// Distinct author names, a JSON array sorted ascending.
    #[sea_orm(column_type = "Json")]
    pub authors: serde_json::Value,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Author names; non-string entries are ignored.
    pub fn author_names(&self) -> Vec<String> {
        self.authors
            .as_array()
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_names() {
        let model = Model {
            owner: "acme".to_string(),
            repo: "rocket".to_string(),
            date: Date::from_ymd_opt(2024, 3, 5).expect("valid date"),
            commits: 3,
            authors: serde_json::json!(["Alice", "Unknown", 7]),
        };
        assert_eq!(model.author_names(), vec!["Alice", "Unknown"]);

        let odd = Model {
            authors: serde_json::json!({"not": "an array"}),
            ..model
        };
        assert!(odd.author_names().is_empty());
    }
}
