//! Integration tests for ranking reconciliation.
//!
//! These tests require the `sqlite` and `migrate` features to be enabled
//! and use an in-memory SQLite database.

#![cfg(all(feature = "sqlite", feature = "migrate"))]

use std::collections::BTreeSet;

use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use toprepos::entity::top_repository::{Column, Entity as TopRepository, Model};
use toprepos::store::{self, SortDirection, SortKey};
use toprepos::{RankedRepository, connect_and_migrate};

/// Create an in-memory SQLite database with migrations applied.
async fn setup_test_db() -> DatabaseConnection {
    connect_and_migrate("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

/// A fetched ranking entry; stars fall as the position grows.
fn ranked(name: &str, position: i32) -> RankedRepository {
    RankedRepository {
        owner: "acme".to_string(),
        name: name.to_string(),
        position_current: position,
        position_previous: None,
        stars: 10_000 - i64::from(position) * 100,
        watchers: 500 + i64::from(position),
        forks: i64::from(position) * 7,
        open_issues: 3,
        language: Some("Rust".to_string()),
    }
}

fn ranking(names: &[&str]) -> Vec<RankedRepository> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| ranked(name, i as i32 + 1))
        .collect()
}

async fn stored(db: &DatabaseConnection) -> Vec<Model> {
    TopRepository::find()
        .order_by_asc(Column::PositionCurrent)
        .all(db)
        .await
        .expect("Failed to read ranking")
}

fn names(rows: &[Model]) -> BTreeSet<String> {
    rows.iter().map(|m| m.full_name.clone()).collect()
}

fn row<'a>(rows: &'a [Model], name: &str) -> &'a Model {
    let full_name = format!("acme/{name}");
    rows.iter()
        .find(|m| m.full_name == full_name)
        .unwrap_or_else(|| panic!("{full_name} should be stored"))
}

#[tokio::test]
async fn test_first_reconcile_stores_every_repository_without_history() {
    let db = setup_test_db().await;

    let outcome = store::reconcile(&db, &ranking(&["alpha", "beta", "gamma"]))
        .await
        .expect("reconcile should succeed");

    assert_eq!(outcome.added, 3);
    assert_eq!(outcome.updated, 0);
    assert_eq!(outcome.removed, 0);

    let rows = stored(&db).await;
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|m| m.position_previous.is_none()));
    assert_eq!(row(&rows, "beta").position_current, 2);
    assert_eq!(row(&rows, "beta").owner, "acme");
    assert_eq!(row(&rows, "beta").name, "beta");
}

#[tokio::test]
async fn test_reconcile_shifts_history_and_drops_leavers() {
    let db = setup_test_db().await;

    store::reconcile(&db, &ranking(&["alpha", "beta", "gamma"]))
        .await
        .expect("first reconcile should succeed");
    let outcome = store::reconcile(&db, &ranking(&["beta", "alpha", "delta"]))
        .await
        .expect("second reconcile should succeed");

    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.updated, 2);
    assert_eq!(outcome.removed, 1);

    let rows = stored(&db).await;
    let expected: BTreeSet<String> = ["acme/alpha", "acme/beta", "acme/delta"]
        .into_iter()
        .map(str::to_string)
        .collect();
    assert_eq!(names(&rows), expected);

    let beta = row(&rows, "beta");
    assert_eq!(beta.position_current, 1);
    assert_eq!(beta.position_previous, Some(2));
    assert_eq!(beta.rank_change(), Some(1));

    let alpha = row(&rows, "alpha");
    assert_eq!(alpha.position_current, 2);
    assert_eq!(alpha.position_previous, Some(1));

    let delta = row(&rows, "delta");
    assert_eq!(delta.position_current, 3);
    assert_eq!(delta.position_previous, None);
}

#[tokio::test]
async fn test_reconcile_refreshes_metrics_of_kept_rows() {
    let db = setup_test_db().await;

    store::reconcile(&db, &ranking(&["alpha"]))
        .await
        .expect("first reconcile should succeed");

    let mut fresh = ranked("alpha", 1);
    fresh.stars = 42_000;
    fresh.language = None;
    store::reconcile(&db, &[fresh])
        .await
        .expect("second reconcile should succeed");

    let rows = stored(&db).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].stars, 42_000);
    assert_eq!(rows[0].language, None);
    assert_eq!(rows[0].position_previous, Some(1));
}

#[tokio::test]
async fn test_duplicate_entries_keep_the_last_occurrence() {
    let db = setup_test_db().await;

    let fresh = vec![ranked("alpha", 1), ranked("beta", 2), ranked("alpha", 3)];
    let outcome = store::reconcile(&db, &fresh)
        .await
        .expect("reconcile should succeed");

    assert_eq!(outcome.added, 2);

    let rows = stored(&db).await;
    assert_eq!(rows.len(), 2);
    let alpha = row(&rows, "alpha");
    assert_eq!(alpha.position_current, 3);
    assert_eq!(alpha.position_previous, None);
}

#[tokio::test]
async fn test_empty_ranking_clears_the_table() {
    let db = setup_test_db().await;

    store::reconcile(&db, &ranking(&["alpha", "beta"]))
        .await
        .expect("first reconcile should succeed");
    let outcome = store::reconcile(&db, &[])
        .await
        .expect("empty reconcile should succeed");

    assert_eq!(outcome.removed, 2);
    assert!(stored(&db).await.is_empty());
    assert!(
        store::tracked(&db)
            .await
            .expect("tracked should succeed")
            .is_empty()
    );
}

#[tokio::test]
async fn test_tracked_follows_current_position() {
    let db = setup_test_db().await;

    store::reconcile(&db, &ranking(&["gamma", "alpha", "beta"]))
        .await
        .expect("reconcile should succeed");

    let tracked = store::tracked(&db).await.expect("tracked should succeed");
    let expected: Vec<(String, String)> = ["gamma", "alpha", "beta"]
        .into_iter()
        .map(|n| ("acme".to_string(), n.to_string()))
        .collect();
    assert_eq!(tracked, expected);
}

#[tokio::test]
async fn test_list_sorted_orders_by_requested_column() {
    let db = setup_test_db().await;

    store::reconcile(&db, &ranking(&["alpha", "beta", "gamma"]))
        .await
        .expect("reconcile should succeed");

    let by_stars = store::list_sorted(&db, SortKey::Stars, SortDirection::Desc)
        .await
        .expect("listing should succeed");
    let order: Vec<&str> = by_stars.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(order, vec!["alpha", "beta", "gamma"]);

    let by_forks = store::list_sorted(&db, SortKey::Forks, SortDirection::Desc)
        .await
        .expect("listing should succeed");
    let order: Vec<&str> = by_forks.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(order, vec!["gamma", "beta", "alpha"]);

    let by_watchers = store::list_sorted(&db, SortKey::Watchers, SortDirection::Asc)
        .await
        .expect("listing should succeed");
    assert_eq!(by_watchers[0].name, "alpha");
}
