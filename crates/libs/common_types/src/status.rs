use serde::{Deserialize, Serialize};
use sqlx::Type;
use utoipa::ToSchema;

/// Lifecycle of a single downloaded photo.
///
/// `Raw` rows are waiting for the vision pipeline, which moves them to
/// `Accepted` or `Rejected` exactly once. The curator promotes a subset of
/// accepted photos to `Selected` (and may demote them back to `Accepted`
/// on re-curation). Rows are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PhotoStatus {
    Raw,
    Accepted,
    Rejected,
    Selected,
}

/// Closed set of reasons a photo can be rejected by the vision pipeline.
///
/// Present on a photo row if and only if its status is `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    NoFace,
    MultiFace,
    Blurry,
    SmallFace,
    LowScore,
    Error,
}

/// Discovery status of a candidate profile.
///
/// `Ready` gates when the candidate becomes visible to the browsing engine.
/// `Error` means the last processing cycle produced zero usable photos; a
/// later discovery run with fresh photos may re-enter `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    New,
    Processing,
    Ready,
    Error,
}
