use crate::browse::ServedCandidate;
use crate::database::PhotoSnapshot;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One candidate as shown to the operator.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CandidateCard {
    pub candidate_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub domain: String,
    pub photos: Vec<PhotoSnapshot>,
    pub position: i64,
    pub replay: bool,
}

impl From<ServedCandidate> for CandidateCard {
    fn from(served: ServedCandidate) -> Self {
        Self {
            candidate_id: served.candidate.remote_id,
            first_name: served.candidate.first_name,
            last_name: served.candidate.last_name,
            domain: served.candidate.domain,
            photos: served.photos,
            position: served.position,
            replay: served.replay,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NextCandidateResponse {
    pub exhausted: bool,
    pub card: Option<CandidateCard>,
}

/// Cursor movement result; `card` is absent when the cursor sits before the
/// first history entry.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CursorResponse {
    pub card: Option<CandidateCard>,
}
