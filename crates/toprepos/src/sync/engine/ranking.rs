use sea_orm::DatabaseConnection;

use crate::platform::{PlatformClient, TopQuery};
use crate::store;

use super::super::progress::{ProgressCallback, SyncProgress, emit};
use super::super::types::RankingSync;

/// Fetch the ranking and reconcile the ranking table with it.
///
/// Both steps are fatal: a provider error leaves the table untouched, and a
/// store error stops reconciliation where it failed.
pub async fn sync_ranking<C: PlatformClient + ?Sized>(
    client: &C,
    db: &DatabaseConnection,
    query: &TopQuery,
    on_progress: Option<&ProgressCallback>,
) -> crate::Result<RankingSync> {
    let ranking = client.search_top_repos(query).await.inspect_err(|e| {
        tracing::error!(error = %e, "Ranking fetch failed");
    })?;
    emit(
        on_progress,
        SyncProgress::RankingFetched {
            count: ranking.len(),
        },
    );

    let outcome = store::reconcile(db, &ranking).await.inspect_err(|e| {
        tracing::error!(error = %e, "Ranking reconciliation failed");
    })?;
    emit(
        on_progress,
        SyncProgress::RankingReconciled {
            added: outcome.added,
            updated: outcome.updated,
            removed: outcome.removed,
        },
    );

    tracing::info!(
        ranked = ranking.len(),
        added = outcome.added,
        updated = outcome.updated,
        removed = outcome.removed,
        "Ranking synced"
    );

    Ok(RankingSync {
        ranked: ranking.len(),
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;
    use crate::entity::top_repository::Model;
    use crate::error::Error;
    use crate::platform::testing::{FakeProvider, ranked};

    #[tokio::test]
    async fn provider_failure_touches_no_table() {
        let provider = FakeProvider::new();
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let err = sync_ranking(&provider, &db, &TopQuery::default(), None)
            .await
            .expect_err("search fails");

        assert!(matches!(err, Error::Provider(_)));
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn fetched_ranking_is_reconciled() {
        let provider = FakeProvider::new().with_ranking(vec![
            ranked("acme", "rocket", 1, 30),
            ranked("acme", "scratch", 2, 20),
        ]);
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![Model {
                full_name: "acme/rocket".to_string(),
                owner: "acme".to_string(),
                name: "rocket".to_string(),
                position_current: 2,
                position_previous: None,
                stars: 1,
                watchers: 1,
                forks: 0,
                open_issues: 0,
                language: None,
                synced_at: Utc::now().fixed_offset(),
            }]])
            .append_exec_results([
                MockExecResult {
                    rows_affected: 0,
                    last_insert_id: 0,
                },
                MockExecResult {
                    rows_affected: 1,
                    last_insert_id: 0,
                },
                MockExecResult {
                    rows_affected: 1,
                    last_insert_id: 0,
                },
            ])
            .into_connection();

        let sync = sync_ranking(&provider, &db, &TopQuery::default(), None)
            .await
            .expect("ranking sync succeeds");

        assert_eq!(sync.ranked, 2);
        assert_eq!(sync.outcome.added, 1);
        assert_eq!(sync.outcome.updated, 1);
        assert_eq!(sync.outcome.removed, 0);
    }
}
