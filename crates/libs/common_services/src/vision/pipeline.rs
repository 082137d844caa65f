use crate::database::{DbError, Photo, PhotoStore, VisionResult};
use crate::vision::{DetectFaces, VisionError, blur_score, encode_embedding, l2_normalize};
use app_state::VisionSettings;
use chrono::Utc;
use common_types::{BoundingBox, PhotoStatus, RejectReason};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, warn};

/// Turns one raw downloaded image into an accepted or rejected,
/// embedding-tagged photo record.
///
/// Checks run cheapest-first and short-circuit on the first failure:
/// face count, blur, face size, detector confidence. Anything unexpected
/// (unreadable file, detector outage past its retries) is recorded as
/// `rejected`/`error` and logged, never raised.
pub struct VisionPipeline {
    detector: Arc<dyn DetectFaces>,
    settings: VisionSettings,
}

struct Verdict {
    status: PhotoStatus,
    reject_reason: Option<RejectReason>,
    face_count: Option<i64>,
    det_score: Option<f32>,
    bbox: Option<BoundingBox>,
    blur_score: Option<f64>,
    embedding: Option<Vec<u8>>,
}

impl Verdict {
    fn rejected(reason: RejectReason) -> Self {
        Self {
            status: PhotoStatus::Rejected,
            reject_reason: Some(reason),
            face_count: None,
            det_score: None,
            bbox: None,
            blur_score: None,
            embedding: None,
        }
    }
}

impl VisionPipeline {
    #[must_use]
    pub fn new(detector: Arc<dyn DetectFaces>, settings: VisionSettings) -> Self {
        Self { detector, settings }
    }

    #[must_use]
    pub fn max_concurrency(&self) -> usize {
        self.settings.max_concurrency.max(1)
    }

    /// Processes one photo and writes the verdict back to the store.
    /// Idempotent: a photo that already left `raw` is returned unchanged.
    pub async fn process(&self, pool: &SqlitePool, photo: Photo) -> Result<Photo, DbError> {
        if photo.status != PhotoStatus::Raw {
            debug!("Photo {} already processed ({:?}), skipping", photo.id, photo.status);
            return Ok(photo);
        }

        let verdict = match self.analyze(&photo).await {
            Ok(verdict) => verdict,
            Err(err) => {
                warn!(
                    "Photo {} (candidate {}) failed analysis: {err}",
                    photo.id, photo.candidate_id
                );
                Verdict::rejected(RejectReason::Error)
            }
        };

        let accepted = verdict.status == PhotoStatus::Accepted;
        let result = VisionResult {
            status: verdict.status,
            reject_reason: verdict.reject_reason,
            face_count: verdict.face_count,
            det_score: verdict.det_score,
            bbox: verdict.bbox,
            blur_score: verdict.blur_score,
            embedding: verdict.embedding,
            embedding_normed: accepted,
            model_name: accepted.then(|| self.settings.model_name.clone()),
            model_version: accepted.then(|| self.settings.model_version.clone()),
            processed_at: Utc::now(),
        };

        PhotoStore::apply_vision_result(pool, photo.id, &result).await?;
        PhotoStore::get(pool, photo.id)
            .await?
            .ok_or_else(|| DbError::Sqlx(sqlx::Error::RowNotFound))
    }

    async fn analyze(&self, photo: &Photo) -> Result<Verdict, VisionError> {
        let path = photo.local_path.as_deref().ok_or(VisionError::MissingFile)?;
        let bytes = tokio::fs::read(path).await?;

        let faces = self.detector.detect(&bytes).await?;
        let face_count = faces.len() as i64;
        if faces.is_empty() {
            return Ok(Verdict {
                face_count: Some(0),
                ..Verdict::rejected(RejectReason::NoFace)
            });
        }
        if faces.len() > 1 {
            return Ok(Verdict {
                face_count: Some(face_count),
                ..Verdict::rejected(RejectReason::MultiFace)
            });
        }

        let face = &faces[0];
        let frame = image::load_from_memory(&bytes)?.to_luma8();
        let sharpness = blur_score(&frame);
        if sharpness < self.settings.min_blur_score {
            return Ok(Verdict {
                face_count: Some(1),
                det_score: Some(face.confidence),
                bbox: Some(face.bbox),
                blur_score: Some(sharpness),
                ..Verdict::rejected(RejectReason::Blurry)
            });
        }

        let frame_area = (frame.width() * frame.height()) as f32;
        if face.bbox.area() < self.settings.min_face_area_frac * frame_area {
            return Ok(Verdict {
                face_count: Some(1),
                det_score: Some(face.confidence),
                bbox: Some(face.bbox),
                blur_score: Some(sharpness),
                ..Verdict::rejected(RejectReason::SmallFace)
            });
        }

        if face.confidence < self.settings.min_confidence {
            return Ok(Verdict {
                face_count: Some(1),
                det_score: Some(face.confidence),
                bbox: Some(face.bbox),
                blur_score: Some(sharpness),
                ..Verdict::rejected(RejectReason::LowScore)
            });
        }

        let mut embedding = face.embedding.clone();
        if !l2_normalize(&mut embedding) {
            return Err(VisionError::DegenerateEmbedding);
        }

        Ok(Verdict {
            status: PhotoStatus::Accepted,
            reject_reason: None,
            face_count: Some(1),
            det_score: Some(face.confidence),
            bbox: Some(face.bbox),
            blur_score: Some(sharpness),
            embedding: Some(encode_embedding(&embedding)),
        })
    }
}
