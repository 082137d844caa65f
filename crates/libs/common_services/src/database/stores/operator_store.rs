use crate::database::{DbError, Operator};
use common_types::SearchFilter;
use sqlx::{Executor, Sqlite, SqlitePool};

pub struct OperatorStore;

impl OperatorStore {
    pub async fn get(
        executor: impl Executor<'_, Database = Sqlite>,
        tg_user_id: i64,
    ) -> Result<Option<Operator>, DbError> {
        Ok(sqlx::query_as::<_, Operator>(
            r#"
            SELECT tg_user_id, access_token, remote_user_id,
                   filter_city_name, filter_city_id, filter_gender,
                   filter_age_from, filter_age_to, history_cursor
            FROM operator
            WHERE tg_user_id = ?
            "#,
        )
        .bind(tg_user_id)
        .fetch_optional(executor)
        .await?)
    }

    /// Creates the operator row on first interaction, then returns it.
    pub async fn get_or_create(pool: &SqlitePool, tg_user_id: i64) -> Result<Operator, DbError> {
        sqlx::query("INSERT OR IGNORE INTO operator (tg_user_id) VALUES (?)")
            .bind(tg_user_id)
            .execute(pool)
            .await?;

        Self::get(pool, tg_user_id)
            .await?
            .ok_or_else(|| DbError::Sqlx(sqlx::Error::RowNotFound))
    }

    pub async fn set_token(
        executor: impl Executor<'_, Database = Sqlite>,
        tg_user_id: i64,
        access_token: &str,
        remote_user_id: i64,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE operator SET access_token = ?, remote_user_id = ? WHERE tg_user_id = ?")
            .bind(access_token)
            .bind(remote_user_id)
            .bind(tg_user_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Replaces the filter and resets the history cursor to 0.
    pub async fn set_filter(
        executor: impl Executor<'_, Database = Sqlite>,
        tg_user_id: i64,
        filter: &SearchFilter,
    ) -> Result<(), DbError> {
        sqlx::query(
            r#"
            UPDATE operator
            SET filter_city_name = ?, filter_city_id = ?, filter_gender = ?,
                filter_age_from = ?, filter_age_to = ?, history_cursor = 0
            WHERE tg_user_id = ?
            "#,
        )
        .bind(&filter.city_name)
        .bind(filter.city_id)
        .bind(filter.gender)
        .bind(filter.age_from)
        .bind(filter.age_to)
        .bind(tg_user_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Caches a resolved city id so discovery does not re-resolve it.
    pub async fn set_city_id(
        executor: impl Executor<'_, Database = Sqlite>,
        tg_user_id: i64,
        city_id: i64,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE operator SET filter_city_id = ? WHERE tg_user_id = ?")
            .bind(city_id)
            .bind(tg_user_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn set_cursor(
        executor: impl Executor<'_, Database = Sqlite>,
        tg_user_id: i64,
        cursor: i64,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE operator SET history_cursor = ? WHERE tg_user_id = ?")
            .bind(cursor)
            .bind(tg_user_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
