use crate::database::DbError;
use sqlx::{Executor, Sqlite};

/// Per-operator membership sets: seen, favorite, blacklist.
///
/// All writes are idempotent (`INSERT OR IGNORE` / plain `DELETE`), matching
/// the toggle semantics the dialog layer expects.
pub struct ListStore;

impl ListStore {
    pub async fn seen_add(
        executor: impl Executor<'_, Database = Sqlite>,
        operator_id: i64,
        candidate_id: i64,
    ) -> Result<(), DbError> {
        sqlx::query("INSERT OR IGNORE INTO seen (operator_id, candidate_id) VALUES (?, ?)")
            .bind(operator_id)
            .bind(candidate_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn seen_contains(
        executor: impl Executor<'_, Database = Sqlite>,
        operator_id: i64,
        candidate_id: i64,
    ) -> Result<bool, DbError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM seen WHERE operator_id = ? AND candidate_id = ?",
        )
        .bind(operator_id)
        .bind(candidate_id)
        .fetch_one(executor)
        .await?;
        Ok(count > 0)
    }

    pub async fn favorite_add(
        executor: impl Executor<'_, Database = Sqlite>,
        operator_id: i64,
        candidate_id: i64,
    ) -> Result<(), DbError> {
        sqlx::query("INSERT OR IGNORE INTO favorite (operator_id, candidate_id) VALUES (?, ?)")
            .bind(operator_id)
            .bind(candidate_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn favorite_remove(
        executor: impl Executor<'_, Database = Sqlite>,
        operator_id: i64,
        candidate_id: i64,
    ) -> Result<(), DbError> {
        sqlx::query("DELETE FROM favorite WHERE operator_id = ? AND candidate_id = ?")
            .bind(operator_id)
            .bind(candidate_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Sorted favorite candidate ids for display.
    pub async fn favorites(
        executor: impl Executor<'_, Database = Sqlite>,
        operator_id: i64,
    ) -> Result<Vec<i64>, DbError> {
        Ok(sqlx::query_scalar::<_, i64>(
            "SELECT candidate_id FROM favorite WHERE operator_id = ? ORDER BY candidate_id ASC",
        )
        .bind(operator_id)
        .fetch_all(executor)
        .await?)
    }

    pub async fn blacklist_add(
        executor: impl Executor<'_, Database = Sqlite>,
        operator_id: i64,
        candidate_id: i64,
    ) -> Result<(), DbError> {
        sqlx::query("INSERT OR IGNORE INTO blacklist (operator_id, candidate_id) VALUES (?, ?)")
            .bind(operator_id)
            .bind(candidate_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn blacklist_contains(
        executor: impl Executor<'_, Database = Sqlite>,
        operator_id: i64,
        candidate_id: i64,
    ) -> Result<bool, DbError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM blacklist WHERE operator_id = ? AND candidate_id = ?",
        )
        .bind(operator_id)
        .bind(candidate_id)
        .fetch_one(executor)
        .await?;
        Ok(count > 0)
    }

    pub async fn blacklist_for(
        executor: impl Executor<'_, Database = Sqlite>,
        operator_id: i64,
    ) -> Result<Vec<i64>, DbError> {
        Ok(sqlx::query_scalar::<_, i64>(
            "SELECT candidate_id FROM blacklist WHERE operator_id = ?",
        )
        .bind(operator_id)
        .fetch_all(executor)
        .await?)
    }
}
