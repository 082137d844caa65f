use crate::database::{DbError, ListStore, QueueStore};
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::info;

/// Materializes the per-operator browsing queue from one discovery run.
pub struct SearchQueueManager;

impl SearchQueueManager {
    /// Replaces the operator's queue with `ranked_candidate_ids`, keeping
    /// the input order. Blacklisted candidates and duplicates are dropped
    /// before positions are assigned, so positions stay dense. The whole
    /// replacement is one transaction: either the new queue is visible or
    /// the old one remains.
    pub async fn materialize(
        pool: &SqlitePool,
        operator_id: i64,
        ranked_candidate_ids: &[i64],
    ) -> Result<usize, DbError> {
        let mut tx = pool.begin().await?;

        let blacklisted: HashSet<i64> = ListStore::blacklist_for(&mut *tx, operator_id)
            .await?
            .into_iter()
            .collect();

        let mut kept = Vec::with_capacity(ranked_candidate_ids.len());
        let mut dedup = HashSet::new();
        for &candidate_id in ranked_candidate_ids {
            if blacklisted.contains(&candidate_id) || !dedup.insert(candidate_id) {
                continue;
            }
            kept.push(candidate_id);
        }

        QueueStore::replace(&mut tx, operator_id, &kept).await?;
        tx.commit().await?;

        info!(
            "Materialized queue for operator {operator_id}: {} of {} candidates",
            kept.len(),
            ranked_candidate_ids.len()
        );
        Ok(kept.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::test_pool;
    use crate::database::{CandidateStore, OperatorStore};

    async fn seed(pool: &SqlitePool, operator_id: i64, candidates: &[i64]) {
        OperatorStore::get_or_create(pool, operator_id).await.expect("operator");
        for &id in candidates {
            CandidateStore::upsert(pool, id, "C", "D", "cd").await.expect("candidate");
        }
    }

    #[tokio::test]
    async fn positions_are_dense_and_ordered() {
        let pool = test_pool().await;
        seed(&pool, 1, &[10, 20, 30]).await;

        let kept = SearchQueueManager::materialize(&pool, 1, &[10, 20, 30]).await.expect("materialize");
        assert_eq!(kept, 3);

        let entries = QueueStore::entries(&pool, 1).await.expect("entries");
        let positions: Vec<(i64, i64)> = entries.iter().map(|e| (e.position, e.candidate_id)).collect();
        assert_eq!(positions, vec![(0, 10), (1, 20), (2, 30)]);
    }

    #[tokio::test]
    async fn blacklisted_candidates_are_filtered_before_positions() {
        let pool = test_pool().await;
        seed(&pool, 1, &[10, 20, 30]).await;
        ListStore::blacklist_add(&pool, 1, 20).await.expect("blacklist");

        SearchQueueManager::materialize(&pool, 1, &[10, 20, 30]).await.expect("materialize");

        let entries = QueueStore::entries(&pool, 1).await.expect("entries");
        let positions: Vec<(i64, i64)> = entries.iter().map(|e| (e.position, e.candidate_id)).collect();
        // Positions stay dense after the filter.
        assert_eq!(positions, vec![(0, 10), (1, 30)]);
    }

    #[tokio::test]
    async fn duplicate_input_ids_keep_first_occurrence() {
        let pool = test_pool().await;
        seed(&pool, 1, &[10, 20]).await;

        SearchQueueManager::materialize(&pool, 1, &[10, 20, 10]).await.expect("materialize");

        let entries = QueueStore::entries(&pool, 1).await.expect("entries");
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn rematerializing_supersedes_previous_run() {
        let pool = test_pool().await;
        seed(&pool, 1, &[10, 20, 30, 40]).await;

        SearchQueueManager::materialize(&pool, 1, &[10, 20]).await.expect("first run");
        SearchQueueManager::materialize(&pool, 1, &[40, 30]).await.expect("second run");

        let entries = QueueStore::entries(&pool, 1).await.expect("entries");
        let positions: Vec<(i64, i64)> = entries.iter().map(|e| (e.position, e.candidate_id)).collect();
        assert_eq!(positions, vec![(0, 40), (1, 30)]);
    }

    #[tokio::test]
    async fn queues_are_per_operator() {
        let pool = test_pool().await;
        seed(&pool, 1, &[10, 20]).await;
        seed(&pool, 2, &[10, 20]).await;

        SearchQueueManager::materialize(&pool, 1, &[10]).await.expect("op 1");
        SearchQueueManager::materialize(&pool, 2, &[20, 10]).await.expect("op 2");

        assert_eq!(QueueStore::entries(&pool, 1).await.expect("entries").len(), 1);
        assert_eq!(QueueStore::entries(&pool, 2).await.expect("entries").len(), 2);
    }
}
