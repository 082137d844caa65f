use crate::database::{DbError, QueueEntry};
use sqlx::{Executor, Sqlite, SqliteConnection};

pub struct QueueStore;

impl QueueStore {
    /// Replaces the operator's queue with the given candidates at dense
    /// 0-based positions. Runs on a connection so the caller can wrap it in
    /// a transaction with whatever else must be atomic.
    pub async fn replace(
        conn: &mut SqliteConnection,
        operator_id: i64,
        candidate_ids: &[i64],
    ) -> Result<(), DbError> {
        sqlx::query("DELETE FROM search_queue WHERE operator_id = ?")
            .bind(operator_id)
            .execute(&mut *conn)
            .await?;

        for (position, candidate_id) in candidate_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO search_queue (operator_id, candidate_id, position) VALUES (?, ?, ?)",
            )
            .bind(operator_id)
            .bind(candidate_id)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    pub async fn entries(
        executor: impl Executor<'_, Database = Sqlite>,
        operator_id: i64,
    ) -> Result<Vec<QueueEntry>, DbError> {
        Ok(sqlx::query_as::<_, QueueEntry>(
            r#"
            SELECT operator_id, candidate_id, position
            FROM search_queue
            WHERE operator_id = ?
            ORDER BY position ASC
            "#,
        )
        .bind(operator_id)
        .fetch_all(executor)
        .await?)
    }

    pub async fn clear(
        executor: impl Executor<'_, Database = Sqlite>,
        operator_id: i64,
    ) -> Result<(), DbError> {
        sqlx::query("DELETE FROM search_queue WHERE operator_id = ?")
            .bind(operator_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Frontier scan: the first queued candidate that is ready, unseen and
    /// not blacklisted, in ascending position order.
    pub async fn next_eligible(
        executor: impl Executor<'_, Database = Sqlite>,
        operator_id: i64,
    ) -> Result<Option<QueueEntry>, DbError> {
        Ok(sqlx::query_as::<_, QueueEntry>(
            r#"
            SELECT q.operator_id, q.candidate_id, q.position
            FROM search_queue q
            JOIN candidate c ON c.remote_id = q.candidate_id
            WHERE q.operator_id = ?
              AND c.status = 'ready'
              AND q.candidate_id NOT IN
                  (SELECT candidate_id FROM seen WHERE operator_id = q.operator_id)
              AND q.candidate_id NOT IN
                  (SELECT candidate_id FROM blacklist WHERE operator_id = q.operator_id)
            ORDER BY q.position ASC
            LIMIT 1
            "#,
        )
        .bind(operator_id)
        .fetch_optional(executor)
        .await?)
    }

    /// Queued candidates still waiting for vision processing, in queue
    /// order. Used to preload profiles ahead of the cursor.
    pub async fn pending_candidates(
        executor: impl Executor<'_, Database = Sqlite>,
        operator_id: i64,
        limit: i64,
    ) -> Result<Vec<i64>, DbError> {
        Ok(sqlx::query_scalar::<_, i64>(
            r#"
            SELECT q.candidate_id
            FROM search_queue q
            JOIN candidate c ON c.remote_id = q.candidate_id
            WHERE q.operator_id = ?
              AND c.status IN ('new', 'error')
              AND q.candidate_id NOT IN
                  (SELECT candidate_id FROM seen WHERE operator_id = q.operator_id)
              AND q.candidate_id NOT IN
                  (SELECT candidate_id FROM blacklist WHERE operator_id = q.operator_id)
            ORDER BY q.position ASC
            LIMIT ?
            "#,
        )
        .bind(operator_id)
        .bind(limit)
        .fetch_all(executor)
        .await?)
    }
}
