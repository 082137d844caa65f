use crate::database::{DbError, Photo, VisionResult};
use chrono::Utc;
use common_types::PhotoStatus;
use sqlx::{Executor, Sqlite};

const PHOTO_COLUMNS: &str = r#"
    id, candidate_id, source_photo_id, likes_count, url, local_path,
    status, reject_reason, face_count, det_score,
    bbox_x1, bbox_y1, bbox_x2, bbox_y2, blur_score,
    embedding, embedding_normed, model_name, model_version,
    downloaded_at, processed_at
"#;

pub struct PhotoStore;

impl PhotoStore {
    /// Records a freshly downloaded image with status `raw`. A duplicate
    /// (candidate, source photo) pair is silently ignored.
    pub async fn insert_raw(
        executor: impl Executor<'_, Database = Sqlite>,
        candidate_id: i64,
        source_photo_id: i64,
        url: &str,
        likes_count: i64,
        local_path: Option<&str>,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO photo
                (candidate_id, source_photo_id, url, likes_count, local_path, status, downloaded_at)
            VALUES (?, ?, ?, ?, ?, 'raw', ?)
            "#,
        )
        .bind(candidate_id)
        .bind(source_photo_id)
        .bind(url)
        .bind(likes_count)
        .bind(local_path)
        .bind(Utc::now())
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get(
        executor: impl Executor<'_, Database = Sqlite>,
        id: i64,
    ) -> Result<Option<Photo>, DbError> {
        let sql = format!("SELECT {PHOTO_COLUMNS} FROM photo WHERE id = ?");
        Ok(sqlx::query_as::<_, Photo>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?)
    }

    pub async fn list_for_candidate(
        executor: impl Executor<'_, Database = Sqlite>,
        candidate_id: i64,
    ) -> Result<Vec<Photo>, DbError> {
        let sql = format!(
            "SELECT {PHOTO_COLUMNS} FROM photo WHERE candidate_id = ? ORDER BY likes_count DESC, id ASC"
        );
        Ok(sqlx::query_as::<_, Photo>(&sql)
            .bind(candidate_id)
            .fetch_all(executor)
            .await?)
    }

    /// Photos of one candidate in a given status, best-liked first.
    pub async fn list_by_status(
        executor: impl Executor<'_, Database = Sqlite>,
        candidate_id: i64,
        status: PhotoStatus,
    ) -> Result<Vec<Photo>, DbError> {
        let sql = format!(
            "SELECT {PHOTO_COLUMNS} FROM photo WHERE candidate_id = ? AND status = ? ORDER BY likes_count DESC, id ASC"
        );
        Ok(sqlx::query_as::<_, Photo>(&sql)
            .bind(candidate_id)
            .bind(status)
            .fetch_all(executor)
            .await?)
    }

    pub async fn count_raw(
        executor: impl Executor<'_, Database = Sqlite>,
        candidate_id: i64,
    ) -> Result<i64, DbError> {
        Ok(sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM photo WHERE candidate_id = ? AND status = 'raw'",
        )
        .bind(candidate_id)
        .fetch_one(executor)
        .await?)
    }

    /// Writes the vision pipeline's verdict back onto the row.
    pub async fn apply_vision_result(
        executor: impl Executor<'_, Database = Sqlite>,
        photo_id: i64,
        result: &VisionResult,
    ) -> Result<(), DbError> {
        sqlx::query(
            r#"
            UPDATE photo
            SET status = ?, reject_reason = ?, face_count = ?, det_score = ?,
                bbox_x1 = ?, bbox_y1 = ?, bbox_x2 = ?, bbox_y2 = ?,
                blur_score = ?, embedding = ?, embedding_normed = ?,
                model_name = ?, model_version = ?, processed_at = ?
            WHERE id = ?
            "#,
        )
        .bind(result.status)
        .bind(result.reject_reason)
        .bind(result.face_count)
        .bind(result.det_score)
        .bind(result.bbox.map(|b| b.x1))
        .bind(result.bbox.map(|b| b.y1))
        .bind(result.bbox.map(|b| b.x2))
        .bind(result.bbox.map(|b| b.y2))
        .bind(result.blur_score)
        .bind(result.embedding.as_deref())
        .bind(result.embedding_normed)
        .bind(result.model_name.as_deref())
        .bind(result.model_version.as_deref())
        .bind(result.processed_at)
        .bind(photo_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Re-curation prelude: previously selected photos go back to accepted.
    pub async fn demote_selected(
        executor: impl Executor<'_, Database = Sqlite>,
        candidate_id: i64,
    ) -> Result<u64, DbError> {
        let result = sqlx::query(
            "UPDATE photo SET status = 'accepted' WHERE candidate_id = ? AND status = 'selected'",
        )
        .bind(candidate_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn mark_selected(
        executor: impl Executor<'_, Database = Sqlite>,
        photo_ids: &[i64],
    ) -> Result<(), DbError> {
        if photo_ids.is_empty() {
            return Ok(());
        }
        let placeholders = vec!["?"; photo_ids.len()].join(", ");
        let sql = format!("UPDATE photo SET status = 'selected' WHERE id IN ({placeholders})");

        let mut query = sqlx::query(&sql);
        for id in photo_ids {
            query = query.bind(*id);
        }
        query.execute(executor).await?;
        Ok(())
    }
}
