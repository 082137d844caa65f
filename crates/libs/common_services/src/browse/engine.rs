use crate::database::{
    Candidate, CandidateStore, DbError, HistoryStore, ListStore, OperatorStore, PhotoSnapshot,
    PhotoStore, QueueStore,
};
use common_types::PhotoStatus;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("history entry is corrupt: {0}")]
    CorruptHistory(#[from] serde_json::Error),
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        Self::Db(err.into())
    }
}

/// One candidate as served to the operator: the profile, the photo set
/// frozen at serve time and where in the history it sits.
#[derive(Debug, Clone)]
pub struct ServedCandidate {
    pub candidate: Candidate,
    pub photos: Vec<PhotoSnapshot>,
    pub position: i64,
    pub replay: bool,
}

#[derive(Debug, Clone)]
pub enum NextOutcome {
    Served(ServedCandidate),
    /// No queued candidate is ready, unseen and not blacklisted.
    Exhausted,
}

/// Deterministic, resumable candidate serving.
///
/// Each operator walks an append-only history with a cursor counting the
/// entries already consumed. While the cursor is behind the history head,
/// `next_candidate` replays recorded entries verbatim; at the head it scans
/// the queue frontier for the first ready, unseen, not-blacklisted
/// candidate, serves it and appends it to the history. Per-operator
/// requests are serialized, so concurrent calls can never double-serve or
/// tear the history sequence.
pub struct BrowseEngine {
    pool: SqlitePool,
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl BrowseEngine {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn operator_lock(&self, operator_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(operator_id).or_default())
    }

    /// Serves the next candidate for the operator, replaying history first.
    pub async fn next_candidate(&self, operator_id: i64) -> Result<NextOutcome, EngineError> {
        let lock = self.operator_lock(operator_id).await;
        let _guard = lock.lock().await;

        OperatorStore::get_or_create(&self.pool, operator_id).await?;
        let mut tx = self.pool.begin().await?;

        let operator = OperatorStore::get(&mut *tx, operator_id)
            .await?
            .ok_or(DbError::Sqlx(sqlx::Error::RowNotFound))?;
        let cursor = operator.history_cursor;
        let head = HistoryStore::max_position(&mut *tx, operator_id).await?;

        if cursor < head {
            let position = cursor + 1;
            let served = self.replay_at(&mut tx, operator_id, position).await?;
            OperatorStore::set_cursor(&mut *tx, operator_id, position).await?;
            tx.commit().await?;
            return Ok(NextOutcome::Served(served));
        }

        let Some(entry) = QueueStore::next_eligible(&mut *tx, operator_id).await? else {
            tx.commit().await?;
            info!("Operator {operator_id}: queue exhausted");
            return Ok(NextOutcome::Exhausted);
        };

        let candidate = CandidateStore::get(&mut *tx, entry.candidate_id)
            .await?
            .ok_or(DbError::Sqlx(sqlx::Error::RowNotFound))?;
        let photos: Vec<PhotoSnapshot> =
            PhotoStore::list_by_status(&mut *tx, entry.candidate_id, PhotoStatus::Selected)
                .await?
                .iter()
                .map(PhotoSnapshot::from)
                .collect();

        let position = head + 1;
        ListStore::seen_add(&mut *tx, operator_id, entry.candidate_id).await?;
        HistoryStore::append(&mut *tx, operator_id, position, entry.candidate_id, &photos).await?;
        OperatorStore::set_cursor(&mut *tx, operator_id, position).await?;
        tx.commit().await?;

        info!(
            "Operator {operator_id}: served candidate {} at position {position}",
            entry.candidate_id
        );
        Ok(NextOutcome::Served(ServedCandidate {
            candidate,
            photos,
            position,
            replay: false,
        }))
    }

    async fn replay_at(
        &self,
        tx: &mut SqliteConnection,
        operator_id: i64,
        position: i64,
    ) -> Result<ServedCandidate, EngineError> {
        let entry = HistoryStore::at_position(&mut *tx, operator_id, position)
            .await?
            .ok_or(DbError::Sqlx(sqlx::Error::RowNotFound))?;
        let candidate = CandidateStore::get(&mut *tx, entry.candidate_id)
            .await?
            .ok_or(DbError::Sqlx(sqlx::Error::RowNotFound))?;
        Ok(ServedCandidate {
            photos: entry.photos()?,
            candidate,
            position,
            replay: true,
        })
    }

    /// Moves the cursor one entry back and returns the card now under it.
    /// Clamped at the start of the history.
    pub async fn rewind(&self, operator_id: i64) -> Result<Option<ServedCandidate>, EngineError> {
        self.seek(operator_id, -1).await
    }

    /// Moves the cursor one entry forward, never past the history head.
    /// Serving genuinely new candidates stays with `next_candidate`.
    pub async fn advance(&self, operator_id: i64) -> Result<Option<ServedCandidate>, EngineError> {
        self.seek(operator_id, 1).await
    }

    /// The card currently under the cursor, if anything was consumed yet.
    pub async fn current_card(
        &self,
        operator_id: i64,
    ) -> Result<Option<ServedCandidate>, EngineError> {
        self.seek(operator_id, 0).await
    }

    async fn seek(
        &self,
        operator_id: i64,
        delta: i64,
    ) -> Result<Option<ServedCandidate>, EngineError> {
        let lock = self.operator_lock(operator_id).await;
        let _guard = lock.lock().await;

        let operator = OperatorStore::get_or_create(&self.pool, operator_id).await?;
        let mut tx = self.pool.begin().await?;

        let head = HistoryStore::max_position(&mut *tx, operator_id).await?;
        let cursor = (operator.history_cursor + delta).clamp(0, head);
        if cursor != operator.history_cursor {
            OperatorStore::set_cursor(&mut *tx, operator_id, cursor).await?;
        }

        let card = if cursor == 0 {
            None
        } else {
            Some(self.replay_at(&mut tx, operator_id, cursor).await?)
        };
        tx.commit().await?;
        Ok(card)
    }

    pub async fn favorite(&self, operator_id: i64, candidate_id: i64) -> Result<(), EngineError> {
        OperatorStore::get_or_create(&self.pool, operator_id).await?;
        ListStore::favorite_add(&self.pool, operator_id, candidate_id).await?;
        Ok(())
    }

    pub async fn unfavorite(&self, operator_id: i64, candidate_id: i64) -> Result<(), EngineError> {
        OperatorStore::get_or_create(&self.pool, operator_id).await?;
        ListStore::favorite_remove(&self.pool, operator_id, candidate_id).await?;
        Ok(())
    }

    pub async fn favorites(&self, operator_id: i64) -> Result<Vec<i64>, EngineError> {
        OperatorStore::get_or_create(&self.pool, operator_id).await?;
        Ok(ListStore::favorites(&self.pool, operator_id).await?)
    }

    /// Excludes the candidate from every future frontier serve. Already
    /// recorded history entries are untouched and still replay.
    pub async fn blacklist(&self, operator_id: i64, candidate_id: i64) -> Result<(), EngineError> {
        OperatorStore::get_or_create(&self.pool, operator_id).await?;
        ListStore::blacklist_add(&self.pool, operator_id, candidate_id).await?;
        info!("Operator {operator_id}: blacklisted candidate {candidate_id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::test_pool;
    use crate::discovery::{CandidateRegistry, SearchQueueManager};
    use common_types::CandidateStatus;

    async fn operator(pool: &SqlitePool, id: i64) {
        OperatorStore::get_or_create(pool, id).await.expect("operator");
    }

    async fn ready_candidate(pool: &SqlitePool, id: i64, photo_id: i64) {
        CandidateStore::upsert(pool, id, "A", "B", "ab").await.expect("candidate");
        PhotoStore::insert_raw(pool, id, photo_id, "https://x.test/p", 10, None)
            .await
            .expect("photo");
        let photos = PhotoStore::list_for_candidate(pool, id).await.expect("list");
        let ids: Vec<i64> = photos.iter().map(|p| p.id).collect();
        PhotoStore::mark_selected(pool, &ids).await.expect("select");

        assert!(CandidateRegistry::mark_processing(pool, id).await.expect("processing"));
        assert!(CandidateRegistry::mark_ready_or_error(pool, id, true).await.expect("ready"));
    }

    async fn new_candidate(pool: &SqlitePool, id: i64) {
        CandidateStore::upsert(pool, id, "A", "B", "ab").await.expect("candidate");
    }

    fn served(outcome: NextOutcome) -> ServedCandidate {
        match outcome {
            NextOutcome::Served(card) => card,
            NextOutcome::Exhausted => panic!("expected a served candidate"),
        }
    }

    #[tokio::test]
    async fn serves_ready_candidates_in_position_order_exactly_once() {
        let pool = test_pool().await;
        let engine = BrowseEngine::new(pool.clone());
        operator(&pool, 1).await;
        for (id, photo) in [(10, 1), (20, 2), (30, 3)] {
            ready_candidate(&pool, id, photo).await;
        }
        SearchQueueManager::materialize(&pool, 1, &[10, 20, 30]).await.expect("queue");

        let first = served(engine.next_candidate(1).await.expect("next"));
        assert_eq!(first.candidate.remote_id, 10);
        assert_eq!(first.position, 1);
        assert!(!first.replay);
        assert!(ListStore::seen_contains(&pool, 1, 10).await.expect("seen"));
        assert!(!ListStore::seen_contains(&pool, 1, 20).await.expect("seen"));

        let second = served(engine.next_candidate(1).await.expect("next"));
        assert_eq!(second.candidate.remote_id, 20);
        let third = served(engine.next_candidate(1).await.expect("next"));
        assert_eq!(third.candidate.remote_id, 30);

        assert!(matches!(
            engine.next_candidate(1).await.expect("next"),
            NextOutcome::Exhausted
        ));
    }

    #[tokio::test]
    async fn blacklisted_candidate_is_never_served() {
        let pool = test_pool().await;
        let engine = BrowseEngine::new(pool.clone());
        operator(&pool, 1).await;
        for (id, photo) in [(10, 1), (20, 2), (30, 3)] {
            ready_candidate(&pool, id, photo).await;
        }
        SearchQueueManager::materialize(&pool, 1, &[10, 20, 30]).await.expect("queue");
        engine.blacklist(1, 10).await.expect("blacklist");
        assert!(ListStore::blacklist_contains(&pool, 1, 10).await.expect("blacklist"));
        assert!(!ListStore::blacklist_contains(&pool, 1, 20).await.expect("blacklist"));

        let first = served(engine.next_candidate(1).await.expect("next"));
        assert_eq!(first.candidate.remote_id, 20);
        let second = served(engine.next_candidate(1).await.expect("next"));
        assert_eq!(second.candidate.remote_id, 30);
        assert!(matches!(
            engine.next_candidate(1).await.expect("next"),
            NextOutcome::Exhausted
        ));
    }

    #[tokio::test]
    async fn replays_history_before_serving_the_frontier() {
        let pool = test_pool().await;
        let engine = BrowseEngine::new(pool.clone());
        operator(&pool, 1).await;
        for (id, photo) in [(10, 1), (20, 2), (30, 3)] {
            ready_candidate(&pool, id, photo).await;
        }
        SearchQueueManager::materialize(&pool, 1, &[10, 20, 30]).await.expect("queue");

        for _ in 0..3 {
            served(engine.next_candidate(1).await.expect("next"));
        }
        // Rewind twice: cursor 3 -> 1.
        engine.rewind(1).await.expect("rewind");
        engine.rewind(1).await.expect("rewind");

        let replayed = served(engine.next_candidate(1).await.expect("next"));
        assert!(replayed.replay);
        assert_eq!(replayed.position, 2);
        assert_eq!(replayed.candidate.remote_id, 20);

        // Replay consumed no new history.
        assert_eq!(HistoryStore::max_position(&pool, 1).await.expect("head"), 3);
        let operator = OperatorStore::get(&pool, 1).await.expect("get").expect("row");
        assert_eq!(operator.history_cursor, 2);
    }

    #[tokio::test]
    async fn replayed_snapshot_is_frozen_at_serve_time() {
        let pool = test_pool().await;
        let engine = BrowseEngine::new(pool.clone());
        operator(&pool, 1).await;
        ready_candidate(&pool, 10, 1).await;
        SearchQueueManager::materialize(&pool, 1, &[10]).await.expect("queue");

        let first = served(engine.next_candidate(1).await.expect("next"));
        assert_eq!(first.photos.len(), 1);

        // Later demotion must not change what the operator saw.
        PhotoStore::demote_selected(&pool, 10).await.expect("demote");
        engine.rewind(1).await.expect("rewind");
        let replayed = served(engine.next_candidate(1).await.expect("next"));
        assert_eq!(replayed.photos, first.photos);
    }

    #[tokio::test]
    async fn unready_candidate_is_skipped_then_served_once_ready() {
        let pool = test_pool().await;
        let engine = BrowseEngine::new(pool.clone());
        operator(&pool, 1).await;
        new_candidate(&pool, 10).await;
        ready_candidate(&pool, 20, 2).await;
        SearchQueueManager::materialize(&pool, 1, &[10, 20]).await.expect("queue");

        let first = served(engine.next_candidate(1).await.expect("next"));
        assert_eq!(first.candidate.remote_id, 20);

        // 10 finishes processing and becomes eligible again at its position.
        PhotoStore::insert_raw(&pool, 10, 1, "https://x.test/p", 5, None).await.expect("photo");
        assert!(CandidateRegistry::mark_processing(&pool, 10).await.expect("processing"));
        assert!(CandidateRegistry::mark_ready_or_error(&pool, 10, true).await.expect("ready"));

        let second = served(engine.next_candidate(1).await.expect("next"));
        assert_eq!(second.candidate.remote_id, 10);
        assert_eq!(second.position, 2);
    }

    #[tokio::test]
    async fn blacklisting_after_serving_keeps_the_history_entry() {
        let pool = test_pool().await;
        let engine = BrowseEngine::new(pool.clone());
        operator(&pool, 1).await;
        ready_candidate(&pool, 10, 1).await;
        SearchQueueManager::materialize(&pool, 1, &[10]).await.expect("queue");

        served(engine.next_candidate(1).await.expect("next"));
        engine.blacklist(1, 10).await.expect("blacklist");

        let card = engine.current_card(1).await.expect("current").expect("card");
        assert_eq!(card.candidate.remote_id, 10);
    }

    #[tokio::test]
    async fn rewind_and_advance_clamp_at_the_edges() {
        let pool = test_pool().await;
        let engine = BrowseEngine::new(pool.clone());
        operator(&pool, 1).await;
        ready_candidate(&pool, 10, 1).await;
        SearchQueueManager::materialize(&pool, 1, &[10]).await.expect("queue");

        // Empty history: nothing to show, cursor pinned at 0.
        assert!(engine.rewind(1).await.expect("rewind").is_none());
        assert!(engine.current_card(1).await.expect("current").is_none());

        served(engine.next_candidate(1).await.expect("next"));

        // Advance never moves past the head.
        let card = engine.advance(1).await.expect("advance").expect("card");
        assert_eq!(card.position, 1);

        // Rewind below the first entry leaves no current card.
        assert!(engine.rewind(1).await.expect("rewind").is_none());
        let operator = OperatorStore::get(&pool, 1).await.expect("get").expect("row");
        assert_eq!(operator.history_cursor, 0);
    }

    #[tokio::test]
    async fn favorites_toggle_and_list() {
        let pool = test_pool().await;
        let engine = BrowseEngine::new(pool.clone());
        operator(&pool, 1).await;
        for id in [10, 20] {
            new_candidate(&pool, id).await;
        }

        engine.favorite(1, 20).await.expect("favorite");
        engine.favorite(1, 10).await.expect("favorite");
        engine.favorite(1, 10).await.expect("idempotent");
        assert_eq!(engine.favorites(1).await.expect("list"), vec![10, 20]);

        engine.unfavorite(1, 20).await.expect("unfavorite");
        assert_eq!(engine.favorites(1).await.expect("list"), vec![10]);
    }

    #[tokio::test]
    async fn operators_browse_independently() {
        let pool = test_pool().await;
        let engine = BrowseEngine::new(pool.clone());
        operator(&pool, 1).await;
        operator(&pool, 2).await;
        ready_candidate(&pool, 10, 1).await;
        SearchQueueManager::materialize(&pool, 1, &[10]).await.expect("queue");
        SearchQueueManager::materialize(&pool, 2, &[10]).await.expect("queue");

        let first = served(engine.next_candidate(1).await.expect("next"));
        assert_eq!(first.candidate.remote_id, 10);

        // Operator 2 still gets the same candidate fresh.
        let second = served(engine.next_candidate(2).await.expect("next"));
        assert_eq!(second.candidate.remote_id, 10);
        assert!(!second.replay);
        assert_eq!(
            CandidateStore::get(&pool, 10).await.expect("get").expect("row").status,
            CandidateStatus::Ready
        );
    }
}
