use chrono::{DateTime, Utc};
use common_types::{BoundingBox, PhotoStatus, RejectReason};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One row per downloaded image, unique on (candidate, source photo id).
///
/// Created with status `raw`, written once by the vision pipeline and
/// possibly again by the curator. Kept forever for audit and re-curation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Photo {
    pub id: i64,
    pub candidate_id: i64,
    pub source_photo_id: i64,
    pub likes_count: i64,
    pub url: String,
    pub local_path: Option<String>,
    pub status: PhotoStatus,
    pub reject_reason: Option<RejectReason>,
    pub face_count: Option<i64>,
    pub det_score: Option<f32>,
    pub bbox_x1: Option<f32>,
    pub bbox_y1: Option<f32>,
    pub bbox_x2: Option<f32>,
    pub bbox_y2: Option<f32>,
    pub blur_score: Option<f64>,
    /// Little-endian f32 bytes, present only on accepted/selected rows.
    pub embedding: Option<Vec<u8>>,
    pub embedding_normed: bool,
    pub model_name: Option<String>,
    pub model_version: Option<String>,
    pub downloaded_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl Photo {
    #[must_use]
    pub fn bbox(&self) -> Option<BoundingBox> {
        Some(BoundingBox {
            x1: self.bbox_x1?,
            y1: self.bbox_y1?,
            x2: self.bbox_x2?,
            y2: self.bbox_y2?,
        })
    }

    /// Decoded embedding vector, if the pipeline stored one.
    #[must_use]
    pub fn embedding_vec(&self) -> Option<Vec<f32>> {
        self.embedding
            .as_deref()
            .map(crate::vision::decode_embedding)
    }
}

/// What the vision pipeline writes back for one photo.
#[derive(Debug, Clone)]
pub struct VisionResult {
    pub status: PhotoStatus,
    pub reject_reason: Option<RejectReason>,
    pub face_count: Option<i64>,
    pub det_score: Option<f32>,
    pub bbox: Option<BoundingBox>,
    pub blur_score: Option<f64>,
    pub embedding: Option<Vec<u8>>,
    pub embedding_normed: bool,
    pub model_name: Option<String>,
    pub model_version: Option<String>,
    pub processed_at: DateTime<Utc>,
}

/// Immutable record of one photo as it was shown to the operator.
///
/// Stored inside a history entry so later re-curation never changes what
/// the operator actually saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoSnapshot {
    pub source_photo_id: i64,
    pub url: String,
    pub local_path: Option<String>,
    pub likes_count: i64,
}

impl From<&Photo> for PhotoSnapshot {
    fn from(photo: &Photo) -> Self {
        Self {
            source_photo_id: photo.source_photo_id,
            url: photo.url.clone(),
            local_path: photo.local_path.clone(),
            likes_count: photo.likes_count,
        }
    }
}
