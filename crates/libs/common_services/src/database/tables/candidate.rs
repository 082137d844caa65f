use chrono::{DateTime, Utc};
use common_types::CandidateStatus;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A discovered profile, shared across operators and keyed by the foreign
/// social-network user id. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Candidate {
    pub remote_id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Profile short name, used to build the public profile URL.
    pub domain: String,
    pub status: CandidateStatus,
    pub discovered_at: DateTime<Utc>,
}
