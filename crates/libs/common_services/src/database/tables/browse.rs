use crate::database::PhotoSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Per-operator ordered association produced by one discovery run.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct QueueEntry {
    pub operator_id: i64,
    pub candidate_id: i64,
    pub position: i64,
}

/// Append-only log row; positions are a dense 1..N sequence per operator.
#[derive(Debug, Clone, FromRow)]
pub struct HistoryEntry {
    pub operator_id: i64,
    pub position: i64,
    pub candidate_id: i64,
    /// JSON-encoded `Vec<PhotoSnapshot>` captured at serve time.
    pub photo_snapshot: String,
    pub served_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn photos(&self) -> Result<Vec<PhotoSnapshot>, serde_json::Error> {
        serde_json::from_str(&self.photo_snapshot)
    }
}
