use crate::database::{DbError, HistoryEntry, PhotoSnapshot};
use chrono::Utc;
use sqlx::{Executor, Sqlite};

pub struct HistoryStore;

impl HistoryStore {
    /// Highest recorded position for the operator, 0 when empty.
    pub async fn max_position(
        executor: impl Executor<'_, Database = Sqlite>,
        operator_id: i64,
    ) -> Result<i64, DbError> {
        Ok(sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(MAX(position), 0) FROM history WHERE operator_id = ?",
        )
        .bind(operator_id)
        .fetch_one(executor)
        .await?)
    }

    /// Appends an immutable entry; `position` must be `max_position + 1`,
    /// the unique index rejects anything else that would collide.
    pub async fn append(
        executor: impl Executor<'_, Database = Sqlite>,
        operator_id: i64,
        position: i64,
        candidate_id: i64,
        photos: &[PhotoSnapshot],
    ) -> Result<(), DbError> {
        let snapshot = serde_json::to_string(photos)?;
        sqlx::query(
            r#"
            INSERT INTO history (operator_id, position, candidate_id, photo_snapshot, served_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(operator_id)
        .bind(position)
        .bind(candidate_id)
        .bind(snapshot)
        .bind(Utc::now())
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn at_position(
        executor: impl Executor<'_, Database = Sqlite>,
        operator_id: i64,
        position: i64,
    ) -> Result<Option<HistoryEntry>, DbError> {
        Ok(sqlx::query_as::<_, HistoryEntry>(
            r#"
            SELECT operator_id, position, candidate_id, photo_snapshot, served_at
            FROM history
            WHERE operator_id = ? AND position = ?
            "#,
        )
        .bind(operator_id)
        .bind(position)
        .fetch_optional(executor)
        .await?)
    }
}
