use crate::database::{CandidateStore, DbError, PhotoStore, QueueStore};
use crate::discovery::{CandidateRegistry, CandidateSource, SourceError};
use crate::vision::{VisionPipeline, curate};
use app_state::{CurationSettings, DiscoverySettings};
use common_types::CandidateStatus;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Drives one candidate from `new` to `ready` (or `error`): downloads the
/// best-liked photos, runs the vision pipeline over them and lets the
/// curator pick the representative set.
pub struct CandidateProcessor {
    pool: SqlitePool,
    pipeline: Arc<VisionPipeline>,
    curation: CurationSettings,
    discovery: DiscoverySettings,
}

impl CandidateProcessor {
    #[must_use]
    pub fn new(
        pool: SqlitePool,
        pipeline: Arc<VisionPipeline>,
        curation: CurationSettings,
        discovery: DiscoverySettings,
    ) -> Self {
        Self {
            pool,
            pipeline,
            curation,
            discovery,
        }
    }

    /// Fully prepares one candidate. Returns false when there was nothing to
    /// do (already ready, or another worker holds the processing slot).
    ///
    /// Photo-level failures (a download that errors, an image the pipeline
    /// rejects as unreadable) are logged and skipped; only a failure to list
    /// the candidate's photos at all aborts the run, after parking the
    /// candidate in `error`.
    pub async fn prepare_candidate(
        &self,
        source: &dyn CandidateSource,
        access_token: &str,
        candidate_id: i64,
    ) -> Result<bool, ProcessorError> {
        let Some(candidate) = CandidateStore::get(&self.pool, candidate_id).await? else {
            warn!("Candidate {candidate_id}: prepare requested for unknown candidate");
            return Ok(false);
        };
        if candidate.status == CandidateStatus::Ready {
            return Ok(false);
        }
        if !CandidateRegistry::mark_processing(&self.pool, candidate_id).await? {
            return Ok(false);
        }

        let listed = match source.candidate_photos(access_token, candidate_id).await {
            Ok(listed) => listed,
            Err(err) => {
                CandidateRegistry::mark_ready_or_error(&self.pool, candidate_id, false).await?;
                return Err(err.into());
            }
        };

        let mut ranked = listed;
        ranked.sort_by(|a, b| b.likes_count.cmp(&a.likes_count));
        ranked.truncate(self.discovery.download_limit);

        let dir = self.discovery.photos_dir.join(candidate_id.to_string());
        if let Err(err) = tokio::fs::create_dir_all(&dir).await {
            warn!("Candidate {candidate_id}: cannot create photo dir: {err}");
            CandidateRegistry::mark_ready_or_error(&self.pool, candidate_id, false).await?;
            return Err(ProcessorError::Db(DbError::Sqlx(sqlx::Error::Io(err))));
        }

        for photo in &ranked {
            let bytes = match source.download(&photo.url).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!(
                        "Candidate {candidate_id}: download of photo {} failed: {err}",
                        photo.source_photo_id
                    );
                    continue;
                }
            };
            let path = dir.join(format!("{}.jpg", photo.source_photo_id));
            if let Err(err) = tokio::fs::write(&path, &bytes).await {
                warn!(
                    "Candidate {candidate_id}: cannot write photo {}: {err}",
                    photo.source_photo_id
                );
                continue;
            }
            PhotoStore::insert_raw(
                &self.pool,
                candidate_id,
                photo.source_photo_id,
                &photo.url,
                photo.likes_count,
                path.to_str(),
            )
            .await?;
        }

        self.process_photos(candidate_id).await?;
        let kept = curate(&self.pool, &self.curation, candidate_id).await?;
        info!(
            "Candidate {candidate_id} prepared: {} photo(s) selected",
            kept.len()
        );
        Ok(true)
    }

    /// Runs the vision pipeline over every raw photo of the candidate,
    /// bounded by the pipeline's concurrency cap. One photo failing never
    /// takes the others down.
    async fn process_photos(&self, candidate_id: i64) -> Result<(), DbError> {
        let photos = PhotoStore::list_for_candidate(&self.pool, candidate_id).await?;
        let semaphore = Arc::new(Semaphore::new(self.pipeline.max_concurrency()));
        let mut set = JoinSet::new();

        for photo in photos {
            let pool = self.pool.clone();
            let pipeline = Arc::clone(&self.pipeline);
            let semaphore = Arc::clone(&semaphore);
            set.spawn(async move {
                let _permit = semaphore.acquire().await;
                let photo_id = photo.id;
                if let Err(err) = pipeline.process(&pool, photo).await {
                    warn!("Photo {photo_id}: vision processing failed: {err}");
                }
            });
        }

        while let Some(joined) = set.join_next().await {
            if let Err(err) = joined {
                warn!("Candidate {candidate_id}: vision task panicked: {err}");
            }
        }
        Ok(())
    }

    /// Prepares the next unprocessed queued candidates so the browsing
    /// frontier stays ahead of the cursor. Per-candidate failures are logged
    /// and the rest of the window still runs.
    pub async fn preload_ahead(
        &self,
        source: &dyn CandidateSource,
        access_token: &str,
        operator_id: i64,
    ) -> Result<usize, DbError> {
        let pending = QueueStore::pending_candidates(
            &self.pool,
            operator_id,
            self.discovery.preload_ahead as i64,
        )
        .await?;

        let mut prepared = 0;
        for candidate_id in pending {
            match self.prepare_candidate(source, access_token, candidate_id).await {
                Ok(true) => prepared += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!("Candidate {candidate_id}: preload failed: {err}");
                }
            }
        }
        Ok(prepared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::test_pool;
    use crate::discovery::{DiscoveredCandidate, DiscoveredPhoto};
    use crate::vision::pipeline::tests::{StubDetector, face, test_settings};
    use async_trait::async_trait;
    use common_types::{PhotoStatus, SearchFilter};
    use image::GrayImage;
    use std::collections::HashSet;
    use std::io::Cursor;
    use std::path::PathBuf;

    struct StubSource {
        photos: Vec<DiscoveredPhoto>,
        image: Vec<u8>,
        failing_urls: HashSet<String>,
        fail_listing: bool,
    }

    #[async_trait]
    impl CandidateSource for StubSource {
        async fn resolve_city(
            &self,
            _access_token: &str,
            _city_name: &str,
        ) -> Result<Option<i64>, SourceError> {
            Ok(None)
        }

        async fn search(
            &self,
            _access_token: &str,
            _filter: &SearchFilter,
        ) -> Result<Vec<DiscoveredCandidate>, SourceError> {
            Ok(vec![])
        }

        async fn candidate_photos(
            &self,
            _access_token: &str,
            _remote_id: i64,
        ) -> Result<Vec<DiscoveredPhoto>, SourceError> {
            if self.fail_listing {
                return Err(SourceError::Api("listing down".to_string()));
            }
            Ok(self.photos.clone())
        }

        async fn download(&self, url: &str) -> Result<Vec<u8>, SourceError> {
            if self.failing_urls.contains(url) {
                return Err(SourceError::Api("download down".to_string()));
            }
            Ok(self.image.clone())
        }
    }

    fn sharp_png() -> Vec<u8> {
        let img = GrayImage::from_fn(64, 64, |x, y| {
            if (x + y) % 2 == 0 {
                image::Luma([0])
            } else {
                image::Luma([255])
            }
        });
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).expect("encode");
        buf.into_inner()
    }

    fn photo(id: i64, likes: i64) -> DiscoveredPhoto {
        DiscoveredPhoto {
            source_photo_id: id,
            url: format!("https://x.test/photo{id}"),
            likes_count: likes,
        }
    }

    fn source(photos: Vec<DiscoveredPhoto>) -> StubSource {
        StubSource {
            photos,
            image: sharp_png(),
            failing_urls: HashSet::new(),
            fail_listing: false,
        }
    }

    fn processor(pool: &SqlitePool, photos_dir: PathBuf, download_limit: usize) -> CandidateProcessor {
        let detector = StubDetector {
            faces: vec![face(0.9, 8.0, 8.0, 56.0, 56.0)],
        };
        let pipeline = Arc::new(VisionPipeline::new(Arc::new(detector), test_settings()));
        CandidateProcessor::new(
            pool.clone(),
            pipeline,
            CurationSettings {
                top_k: 3,
                duplicate_threshold: 0.92,
            },
            DiscoverySettings {
                photos_dir,
                download_limit,
                preload_ahead: 5,
            },
        )
    }

    #[tokio::test]
    async fn downloads_best_liked_photos_up_to_the_limit() {
        let pool = test_pool().await;
        let dir = tempfile::tempdir().expect("tempdir");
        CandidateStore::upsert(&pool, 7, "A", "B", "ab").await.expect("candidate");

        let processor = processor(&pool, dir.path().to_path_buf(), 2);
        let source = source(vec![photo(1, 5), photo(2, 50), photo(3, 20)]);
        assert!(processor.prepare_candidate(&source, "t", 7).await.expect("prepare"));

        let photos = PhotoStore::list_for_candidate(&pool, 7).await.expect("list");
        let ids: Vec<i64> = photos.iter().map(|p| p.source_photo_id).collect();
        assert_eq!(ids, vec![2, 3]);
        for p in &photos {
            assert!(tokio::fs::try_exists(p.local_path.as_deref().expect("path"))
                .await
                .expect("stat"));
        }

        let candidate = CandidateStore::get(&pool, 7).await.expect("get").expect("row");
        assert_eq!(candidate.status, CandidateStatus::Ready);

        // Curation leaves no photo behind in the raw state.
        assert_eq!(PhotoStore::count_raw(&pool, 7).await.expect("count"), 0);
    }

    #[tokio::test]
    async fn failed_download_is_skipped_not_fatal() {
        let pool = test_pool().await;
        let dir = tempfile::tempdir().expect("tempdir");
        CandidateStore::upsert(&pool, 7, "A", "B", "ab").await.expect("candidate");

        let processor = processor(&pool, dir.path().to_path_buf(), 3);
        let mut source = source(vec![photo(1, 30), photo(2, 20)]);
        source.failing_urls.insert("https://x.test/photo1".to_string());

        assert!(processor.prepare_candidate(&source, "t", 7).await.expect("prepare"));

        let photos = PhotoStore::list_for_candidate(&pool, 7).await.expect("list");
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].source_photo_id, 2);
        assert_eq!(photos[0].status, PhotoStatus::Selected);
    }

    #[tokio::test]
    async fn ready_candidate_is_not_reprocessed() {
        let pool = test_pool().await;
        let dir = tempfile::tempdir().expect("tempdir");
        CandidateStore::upsert(&pool, 7, "A", "B", "ab").await.expect("candidate");

        let processor = processor(&pool, dir.path().to_path_buf(), 2);
        let source = source(vec![photo(1, 5)]);
        assert!(processor.prepare_candidate(&source, "t", 7).await.expect("first"));
        assert!(!processor.prepare_candidate(&source, "t", 7).await.expect("second"));
    }

    #[tokio::test]
    async fn listing_failure_parks_candidate_in_error() {
        let pool = test_pool().await;
        let dir = tempfile::tempdir().expect("tempdir");
        CandidateStore::upsert(&pool, 7, "A", "B", "ab").await.expect("candidate");

        let processor = processor(&pool, dir.path().to_path_buf(), 2);
        let mut source = source(vec![]);
        source.fail_listing = true;

        let result = processor.prepare_candidate(&source, "t", 7).await;
        assert!(matches!(result, Err(ProcessorError::Source(_))));

        let candidate = CandidateStore::get(&pool, 7).await.expect("get").expect("row");
        assert_eq!(candidate.status, CandidateStatus::Error);
    }

    #[tokio::test]
    async fn no_usable_photos_parks_candidate_in_error() {
        let pool = test_pool().await;
        let dir = tempfile::tempdir().expect("tempdir");
        CandidateStore::upsert(&pool, 7, "A", "B", "ab").await.expect("candidate");

        let processor = processor(&pool, dir.path().to_path_buf(), 2);
        let source = source(vec![]);
        assert!(processor.prepare_candidate(&source, "t", 7).await.expect("prepare"));

        let candidate = CandidateStore::get(&pool, 7).await.expect("get").expect("row");
        assert_eq!(candidate.status, CandidateStatus::Error);
    }

    #[tokio::test]
    async fn preload_prepares_pending_queue_window() {
        let pool = test_pool().await;
        let dir = tempfile::tempdir().expect("tempdir");
        crate::database::OperatorStore::get_or_create(&pool, 1).await.expect("operator");
        for id in [10, 20] {
            CandidateStore::upsert(&pool, id, "A", "B", "ab").await.expect("candidate");
        }
        crate::discovery::SearchQueueManager::materialize(&pool, 1, &[10, 20])
            .await
            .expect("queue");

        let processor = processor(&pool, dir.path().to_path_buf(), 2);
        let source = source(vec![photo(1, 5)]);
        let prepared = processor.preload_ahead(&source, "t", 1).await.expect("preload");
        assert_eq!(prepared, 2);

        for id in [10, 20] {
            let candidate = CandidateStore::get(&pool, id).await.expect("get").expect("row");
            assert_eq!(candidate.status, CandidateStatus::Ready);
        }
    }
}
