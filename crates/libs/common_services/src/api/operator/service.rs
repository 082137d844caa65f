use crate::api::operator::error::OperatorError;
use crate::api::operator::interfaces::{
    DiscoverResponse, DiscoverStatus, FavoritesResponse, SetFilterParams, SetTokenParams,
};
use crate::database::{ListStore, OperatorStore, QueueStore};
use crate::discovery::{CandidateSource, DiscoveryOutcome, run_discovery};
use common_types::SearchFilter;
use sqlx::SqlitePool;
use tracing::info;

/// Replaces the operator's search filter. The queue from the previous
/// filter is dropped and the history cursor rewinds to the start; the
/// history itself is preserved.
pub async fn set_filter(
    pool: &SqlitePool,
    operator_id: i64,
    params: SetFilterParams,
) -> Result<(), OperatorError> {
    OperatorStore::get_or_create(pool, operator_id).await?;
    let filter = SearchFilter {
        city_name: params.city_name,
        city_id: None,
        gender: params.gender,
        age_from: params.age_from,
        age_to: params.age_to,
    };
    OperatorStore::set_filter(pool, operator_id, &filter).await?;
    QueueStore::clear(pool, operator_id).await?;
    info!("Operator {operator_id}: filter replaced, queue cleared");
    Ok(())
}

pub async fn set_token(
    pool: &SqlitePool,
    operator_id: i64,
    params: SetTokenParams,
) -> Result<(), OperatorError> {
    OperatorStore::get_or_create(pool, operator_id).await?;
    OperatorStore::set_token(pool, operator_id, &params.access_token, params.remote_user_id)
        .await?;
    Ok(())
}

pub async fn list_favorites(
    pool: &SqlitePool,
    operator_id: i64,
) -> Result<FavoritesResponse, OperatorError> {
    OperatorStore::get_or_create(pool, operator_id).await?;
    let candidate_ids = ListStore::favorites(pool, operator_id).await?;
    Ok(FavoritesResponse { candidate_ids })
}

pub async fn discover(
    pool: &SqlitePool,
    source: &dyn CandidateSource,
    operator_id: i64,
) -> Result<DiscoverResponse, OperatorError> {
    let response = match run_discovery(pool, source, operator_id).await? {
        DiscoveryOutcome::Ran { discovered, queued } => DiscoverResponse {
            status: DiscoverStatus::Ran,
            discovered,
            queued,
        },
        DiscoveryOutcome::MissingToken => empty(DiscoverStatus::MissingToken),
        DiscoveryOutcome::MissingFilter => empty(DiscoverStatus::MissingFilter),
        DiscoveryOutcome::CityNotFound => empty(DiscoverStatus::CityNotFound),
    };
    Ok(response)
}

fn empty(status: DiscoverStatus) -> DiscoverResponse {
    DiscoverResponse {
        status,
        discovered: 0,
        queued: 0,
    }
}
