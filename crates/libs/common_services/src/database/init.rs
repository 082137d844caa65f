use crate::database::DbError;
use sqlx::SqlitePool;
use tracing::debug;

/// Creates every table this service relies on. Safe to call on every start.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), DbError> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS operator (
            tg_user_id      INTEGER PRIMARY KEY,
            access_token    TEXT,
            remote_user_id  INTEGER,
            filter_city_name TEXT,
            filter_city_id  INTEGER,
            filter_gender   TEXT,
            filter_age_from INTEGER,
            filter_age_to   INTEGER,
            history_cursor  INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS candidate (
            remote_id     INTEGER PRIMARY KEY,
            first_name    TEXT NOT NULL DEFAULT '',
            last_name     TEXT NOT NULL DEFAULT '',
            domain        TEXT NOT NULL DEFAULT '',
            status        TEXT NOT NULL DEFAULT 'new',
            discovered_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS photo (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            candidate_id     INTEGER NOT NULL REFERENCES candidate(remote_id),
            source_photo_id  INTEGER NOT NULL,
            likes_count      INTEGER NOT NULL DEFAULT 0,
            url              TEXT NOT NULL,
            local_path       TEXT,
            status           TEXT NOT NULL DEFAULT 'raw',
            reject_reason    TEXT,
            face_count       INTEGER,
            det_score        REAL,
            bbox_x1          REAL,
            bbox_y1          REAL,
            bbox_x2          REAL,
            bbox_y2          REAL,
            blur_score       REAL,
            embedding        BLOB,
            embedding_normed INTEGER NOT NULL DEFAULT 0,
            model_name       TEXT,
            model_version    TEXT,
            downloaded_at    TEXT NOT NULL,
            processed_at     TEXT,
            UNIQUE (candidate_id, source_photo_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS search_queue (
            operator_id  INTEGER NOT NULL REFERENCES operator(tg_user_id),
            candidate_id INTEGER NOT NULL REFERENCES candidate(remote_id),
            position     INTEGER NOT NULL,
            UNIQUE (operator_id, candidate_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS seen (
            operator_id  INTEGER NOT NULL,
            candidate_id INTEGER NOT NULL,
            UNIQUE (operator_id, candidate_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS history (
            operator_id    INTEGER NOT NULL,
            position       INTEGER NOT NULL,
            candidate_id   INTEGER NOT NULL,
            photo_snapshot TEXT NOT NULL,
            served_at      TEXT NOT NULL,
            UNIQUE (operator_id, position)
        )
        "#,
    )
    .execute(pool)
    .await?;

    for table in ["favorite", "blacklist"] {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                operator_id  INTEGER NOT NULL,
                candidate_id INTEGER NOT NULL,
                UNIQUE (operator_id, candidate_id)
            )
            "#
        ))
        .execute(pool)
        .await?;
    }

    debug!("Database schema initialized");
    Ok(())
}
