use crate::database::{CandidateStore, DbError};
use common_types::CandidateStatus;
use sqlx::{Executor, Sqlite};
use tracing::warn;

/// Guarded status transitions for candidate profiles.
///
/// Each transition only fires from its valid source states; anything else
/// is reported as a benign conflict (`Ok(false)`) and logged, never an
/// error. The guard runs inside the UPDATE itself so concurrent callers
/// cannot race a candidate through the same transition twice.
pub struct CandidateRegistry;

impl CandidateRegistry {
    /// Records a candidate on discovery. New profiles start at `new`;
    /// re-discovered profiles only get their name fields refreshed.
    pub async fn mark_discovered(
        executor: impl Executor<'_, Database = Sqlite>,
        remote_id: i64,
        first_name: &str,
        last_name: &str,
        domain: &str,
    ) -> Result<(), DbError> {
        CandidateStore::upsert(executor, remote_id, first_name, last_name, domain).await
    }

    /// Entered when photo rows are being written / re-written for the
    /// candidate. `error` and `ready` may re-enter processing when a later
    /// discovery run adds fresh photos.
    pub async fn mark_processing(
        executor: impl Executor<'_, Database = Sqlite>,
        remote_id: i64,
    ) -> Result<bool, DbError> {
        let moved = CandidateStore::try_transition(
            executor,
            remote_id,
            &[
                CandidateStatus::New,
                CandidateStatus::Ready,
                CandidateStatus::Error,
            ],
            CandidateStatus::Processing,
        )
        .await?;
        if !moved {
            warn!("Candidate {remote_id}: mark_processing had no effect (already processing or unknown)");
        }
        Ok(moved)
    }

    /// Finishes a processing cycle: `ready` when curation kept at least one
    /// photo, `error` otherwise. Only valid from `processing`.
    pub async fn mark_ready_or_error(
        executor: impl Executor<'_, Database = Sqlite>,
        remote_id: i64,
        has_photos: bool,
    ) -> Result<bool, DbError> {
        let target = if has_photos {
            CandidateStatus::Ready
        } else {
            CandidateStatus::Error
        };
        let moved = CandidateStore::try_transition(
            executor,
            remote_id,
            &[CandidateStatus::Processing],
            target,
        )
        .await?;
        if !moved {
            warn!("Candidate {remote_id}: mark_ready_or_error({target:?}) had no effect");
        }
        Ok(moved)
    }
}
