//! The `migrate` command: schema management for the leaderboard tables.

use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait};
use toprepos::db;
use toprepos::migration::{Migrator, MigratorTrait};
use toprepos::{DailyActivityEntity, TopRepository};

use crate::MigrateAction;

/// Where the schema stands, and how much data sits on top of it.
#[derive(Debug, Default, PartialEq, Eq)]
struct SchemaReport {
    applied: Vec<String>,
    pending: Vec<String>,
    /// Row counts, known only once the schema is applied.
    ranked_rows: Option<u64>,
    activity_rows: Option<u64>,
}

impl SchemaReport {
    fn is_current(&self) -> bool {
        self.pending.is_empty() && !self.applied.is_empty()
    }
}

async fn schema_report(db: &DatabaseConnection) -> Result<SchemaReport, DbErr> {
    let applied: Vec<String> = Migrator::get_applied_migrations(db)
        .await?
        .iter()
        .map(|m| m.name().to_string())
        .collect();
    let pending: Vec<String> = Migrator::get_pending_migrations(db)
        .await?
        .iter()
        .map(|m| m.name().to_string())
        .collect();

    let mut report = SchemaReport {
        applied,
        pending,
        ..Default::default()
    };
    if report.is_current() {
        report.ranked_rows = Some(TopRepository::find().count(db).await?);
        report.activity_rows = Some(DailyActivityEntity::find().count(db).await?);
    }
    Ok(report)
}

fn print_report(report: &SchemaReport) {
    for name in &report.applied {
        println!("  applied  {}", name);
    }
    for name in &report.pending {
        println!("  pending  {}", name);
    }
    match (report.ranked_rows, report.activity_rows) {
        (Some(ranked), Some(days)) => {
            println!("Leaderboard: {} ranked repositories, {} activity days.", ranked, days)
        }
        _ => println!("Leaderboard tables are not available until migrations are applied."),
    }
}

pub(crate) async fn handle_migrate(
    action: MigrateAction,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;

    match action {
        MigrateAction::Up => {
            let pending = Migrator::get_pending_migrations(&db).await?.len();
            if pending == 0 {
                println!("Schema is up to date.");
            } else {
                println!("Applying {} migration(s)...", pending);
                Migrator::up(&db, None).await?;
                println!("Leaderboard schema ready.");
            }
        }
        MigrateAction::Down => {
            let before = schema_report(&db).await?;
            if let (Some(ranked), Some(days)) = (before.ranked_rows, before.activity_rows) {
                println!(
                    "Rolling back: {} ranked repositories and {} activity days will be dropped.",
                    ranked, days
                );
            }
            Migrator::down(&db, Some(1)).await?;
            println!("Rollback complete.");
        }
        MigrateAction::Status => {
            println!("Migration status:");
            print_report(&schema_report(&db).await?);
        }
        MigrateAction::Fresh => {
            println!("Dropping the ranking and activity tables and recreating them...");
            Migrator::fresh(&db).await?;
            println!("Leaderboard schema recreated empty.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn report_on_empty_database_lists_pending_only() {
        let db = db::connect("sqlite::memory:").await.unwrap();

        let report = schema_report(&db).await.unwrap();

        assert!(report.applied.is_empty());
        assert_eq!(report.pending.len(), 1);
        assert!(!report.is_current());
        assert_eq!(report.ranked_rows, None);
        print_report(&report);
    }

    #[tokio::test]
    async fn report_after_migration_counts_both_tables() {
        let db = db::connect_and_migrate("sqlite::memory:").await.unwrap();
        toprepos::store::upsert_day(
            &db,
            "acme",
            "rocket",
            chrono::NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            2,
            &std::collections::BTreeSet::from(["Alice".to_string()]),
        )
        .await
        .unwrap();

        let report = schema_report(&db).await.unwrap();

        assert!(report.is_current());
        assert_eq!(report.ranked_rows, Some(0));
        assert_eq!(report.activity_rows, Some(1));
    }
}
