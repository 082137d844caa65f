use crate::database::{DbError, Photo, PhotoStore};
use crate::discovery::CandidateRegistry;
use crate::vision::cosine_similarity;
use app_state::CurationSettings;
use common_types::PhotoStatus;
use sqlx::SqlitePool;
use tracing::info;

/// Selects the representative photo set for one candidate.
///
/// Accepted photos are ranked by like count, then walked with a
/// near-duplicate filter: a photo is kept only while its cosine similarity
/// to every already-kept photo stays below the duplicate threshold, until K
/// photos are kept. Kept photos become `selected` and the candidate flips
/// to `ready` (or `error` when nothing was accepted at all).
///
/// Safe to re-run when new photos arrive later: previous `selected` marks
/// are demoted back to `accepted` first, so the outcome depends only on the
/// current accepted set.
pub async fn curate(
    pool: &SqlitePool,
    settings: &CurationSettings,
    candidate_id: i64,
) -> Result<Vec<Photo>, DbError> {
    let mut tx = pool.begin().await?;

    PhotoStore::demote_selected(&mut *tx, candidate_id).await?;
    let accepted = PhotoStore::list_by_status(&mut *tx, candidate_id, PhotoStatus::Accepted).await?;

    let mut kept: Vec<Photo> = Vec::with_capacity(settings.top_k);
    let mut kept_embeddings: Vec<Vec<f32>> = Vec::with_capacity(settings.top_k);

    for photo in accepted {
        if kept.len() >= settings.top_k {
            break;
        }
        let Some(embedding) = photo.embedding_vec() else {
            continue;
        };
        let duplicate = kept_embeddings
            .iter()
            .any(|other| cosine_similarity(&embedding, other) >= settings.duplicate_threshold);
        if duplicate {
            continue;
        }
        kept_embeddings.push(embedding);
        kept.push(photo);
    }

    let kept_ids: Vec<i64> = kept.iter().map(|p| p.id).collect();
    PhotoStore::mark_selected(&mut *tx, &kept_ids).await?;
    CandidateRegistry::mark_ready_or_error(&mut *tx, candidate_id, !kept.is_empty()).await?;

    tx.commit().await?;

    info!(
        "Curated candidate {candidate_id}: kept {} photo(s)",
        kept.len()
    );

    for photo in &mut kept {
        photo.status = PhotoStatus::Selected;
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::test_pool;
    use crate::database::{CandidateStore, VisionResult};
    use crate::discovery::CandidateRegistry;
    use crate::vision::{encode_embedding, l2_normalize};
    use chrono::Utc;
    use common_types::{CandidateStatus, PhotoStatus};

    fn settings() -> CurationSettings {
        CurationSettings {
            top_k: 3,
            duplicate_threshold: 0.92,
        }
    }

    async fn insert_accepted(
        pool: &SqlitePool,
        candidate_id: i64,
        source_photo_id: i64,
        likes: i64,
        embedding: Vec<f32>,
    ) -> i64 {
        PhotoStore::insert_raw(pool, candidate_id, source_photo_id, "https://x.test/p", likes, None)
            .await
            .expect("insert");
        let photo = PhotoStore::list_for_candidate(pool, candidate_id)
            .await
            .expect("list")
            .into_iter()
            .find(|p| p.source_photo_id == source_photo_id)
            .expect("row");

        let mut normed = embedding;
        assert!(l2_normalize(&mut normed));
        let result = VisionResult {
            status: PhotoStatus::Accepted,
            reject_reason: None,
            face_count: Some(1),
            det_score: Some(0.9),
            bbox: None,
            blur_score: Some(200.0),
            embedding: Some(encode_embedding(&normed)),
            embedding_normed: true,
            model_name: Some("stub".into()),
            model_version: Some("1".into()),
            processed_at: Utc::now(),
        };
        PhotoStore::apply_vision_result(pool, photo.id, &result)
            .await
            .expect("vision result");
        photo.id
    }

    async fn processing_candidate(pool: &SqlitePool, id: i64) {
        CandidateStore::upsert(pool, id, "A", "B", "ab").await.expect("upsert");
        assert!(CandidateRegistry::mark_processing(pool, id).await.expect("processing"));
    }

    async fn statuses(pool: &SqlitePool, candidate_id: i64) -> Vec<(i64, PhotoStatus)> {
        PhotoStore::list_for_candidate(pool, candidate_id)
            .await
            .expect("list")
            .into_iter()
            .map(|p| (p.source_photo_id, p.status))
            .collect()
    }

    #[tokio::test]
    async fn keeps_top_liked_distinct_photos() {
        let pool = test_pool().await;
        processing_candidate(&pool, 7).await;

        insert_accepted(&pool, 7, 1, 100, vec![1.0, 0.0, 0.0]).await;
        insert_accepted(&pool, 7, 2, 90, vec![0.0, 1.0, 0.0]).await;
        insert_accepted(&pool, 7, 3, 80, vec![0.0, 0.0, 1.0]).await;
        insert_accepted(&pool, 7, 4, 70, vec![0.5, 0.5, 0.0]).await;

        let kept = curate(&pool, &settings(), 7).await.expect("curate");
        let kept_ids: Vec<i64> = kept.iter().map(|p| p.source_photo_id).collect();
        assert_eq!(kept_ids, vec![1, 2, 3]);

        let candidate = CandidateStore::get(&pool, 7).await.expect("get").expect("row");
        assert_eq!(candidate.status, CandidateStatus::Ready);
    }

    #[tokio::test]
    async fn near_duplicates_are_filtered() {
        let pool = test_pool().await;
        processing_candidate(&pool, 7).await;

        // Second photo is almost identical to the first (cos ~ 0.999).
        insert_accepted(&pool, 7, 1, 100, vec![1.0, 0.0, 0.0]).await;
        insert_accepted(&pool, 7, 2, 90, vec![1.0, 0.01, 0.0]).await;
        insert_accepted(&pool, 7, 3, 80, vec![0.0, 1.0, 0.0]).await;

        let kept = curate(&pool, &settings(), 7).await.expect("curate");
        let kept_ids: Vec<i64> = kept.iter().map(|p| p.source_photo_id).collect();
        assert_eq!(kept_ids, vec![1, 3]);

        // No two kept photos at or above the duplicate threshold.
        for (i, a) in kept.iter().enumerate() {
            for b in kept.iter().skip(i + 1) {
                let sim = cosine_similarity(
                    &a.embedding_vec().expect("emb"),
                    &b.embedding_vec().expect("emb"),
                );
                assert!(sim < 0.92);
            }
        }
    }

    #[tokio::test]
    async fn curation_is_idempotent() {
        let pool = test_pool().await;
        processing_candidate(&pool, 7).await;

        insert_accepted(&pool, 7, 1, 100, vec![1.0, 0.0, 0.0]).await;
        insert_accepted(&pool, 7, 2, 90, vec![1.0, 0.01, 0.0]).await;
        insert_accepted(&pool, 7, 3, 80, vec![0.0, 1.0, 0.0]).await;

        let first = curate(&pool, &settings(), 7).await.expect("curate");
        let first_ids: Vec<i64> = first.iter().map(|p| p.id).collect();
        let before = statuses(&pool, 7).await;

        // Re-entering processing and curating again must land identically.
        assert!(CandidateRegistry::mark_processing(&pool, 7).await.expect("processing"));
        let second = curate(&pool, &settings(), 7).await.expect("curate");
        let second_ids: Vec<i64> = second.iter().map(|p| p.id).collect();

        assert_eq!(first_ids, second_ids);
        assert_eq!(before, statuses(&pool, 7).await);
    }

    #[tokio::test]
    async fn zero_accepted_photos_marks_candidate_error() {
        let pool = test_pool().await;
        processing_candidate(&pool, 7).await;

        let kept = curate(&pool, &settings(), 7).await.expect("curate");
        assert!(kept.is_empty());

        let candidate = CandidateStore::get(&pool, 7).await.expect("get").expect("row");
        assert_eq!(candidate.status, CandidateStatus::Error);
    }
}
