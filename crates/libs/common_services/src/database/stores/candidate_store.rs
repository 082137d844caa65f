use crate::database::{Candidate, DbError};
use chrono::Utc;
use common_types::CandidateStatus;
use sqlx::{Executor, Sqlite};

pub struct CandidateStore;

impl CandidateStore {
    /// Inserts the candidate on first discovery by any operator; on later
    /// discoveries only the name fields are refreshed, status is untouched.
    pub async fn upsert(
        executor: impl Executor<'_, Database = Sqlite>,
        remote_id: i64,
        first_name: &str,
        last_name: &str,
        domain: &str,
    ) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO candidate (remote_id, first_name, last_name, domain, status, discovered_at)
            VALUES (?, ?, ?, ?, 'new', ?)
            ON CONFLICT (remote_id) DO UPDATE
            SET first_name = excluded.first_name,
                last_name = excluded.last_name,
                domain = excluded.domain
            "#,
        )
        .bind(remote_id)
        .bind(first_name)
        .bind(last_name)
        .bind(domain)
        .bind(Utc::now())
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn get(
        executor: impl Executor<'_, Database = Sqlite>,
        remote_id: i64,
    ) -> Result<Option<Candidate>, DbError> {
        Ok(sqlx::query_as::<_, Candidate>(
            r#"
            SELECT remote_id, first_name, last_name, domain, status, discovered_at
            FROM candidate
            WHERE remote_id = ?
            "#,
        )
        .bind(remote_id)
        .fetch_optional(executor)
        .await?)
    }

    /// Atomically moves the candidate to `to` if its current status is one
    /// of `from`. Returns false when the guard did not match, which callers
    /// treat as a benign conflict.
    pub async fn try_transition(
        executor: impl Executor<'_, Database = Sqlite>,
        remote_id: i64,
        from: &[CandidateStatus],
        to: CandidateStatus,
    ) -> Result<bool, DbError> {
        let placeholders = vec!["?"; from.len()].join(", ");
        let sql =
            format!("UPDATE candidate SET status = ? WHERE remote_id = ? AND status IN ({placeholders})");

        let mut query = sqlx::query(&sql).bind(to).bind(remote_id);
        for status in from {
            query = query.bind(*status);
        }

        let result = query.execute(executor).await?;
        Ok(result.rows_affected() > 0)
    }
}
