use crate::database::{DbError, OperatorStore};
use crate::discovery::{CandidateRegistry, CandidateSource, SearchQueueManager, SourceError};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Result of one discovery run. The non-`Ran` variants are operator-state
/// problems the dialog layer turns into prompts, not failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    Ran { discovered: usize, queued: usize },
    MissingToken,
    MissingFilter,
    CityNotFound,
}

/// Runs one discovery cycle for the operator: resolve the filter's city if
/// it is not cached yet, search the social network, record every returned
/// profile and rebuild the browsing queue in result order.
pub async fn run_discovery(
    pool: &SqlitePool,
    source: &dyn CandidateSource,
    operator_id: i64,
) -> Result<DiscoveryOutcome, DiscoveryError> {
    let operator = OperatorStore::get_or_create(pool, operator_id).await?;
    let Some(access_token) = operator.access_token.as_deref() else {
        return Ok(DiscoveryOutcome::MissingToken);
    };
    let Some(mut filter) = operator.filter() else {
        return Ok(DiscoveryOutcome::MissingFilter);
    };

    if filter.city_id.is_none() {
        let Some(city_id) = source.resolve_city(access_token, &filter.city_name).await? else {
            return Ok(DiscoveryOutcome::CityNotFound);
        };
        OperatorStore::set_city_id(pool, operator_id, city_id).await?;
        filter.city_id = Some(city_id);
    }

    let found = source.search(access_token, &filter).await?;
    for candidate in &found {
        CandidateRegistry::mark_discovered(
            pool,
            candidate.remote_id,
            &candidate.first_name,
            &candidate.last_name,
            &candidate.domain,
        )
        .await?;
    }

    let ranked: Vec<i64> = found.iter().map(|c| c.remote_id).collect();
    let queued = SearchQueueManager::materialize(pool, operator_id, &ranked).await?;

    info!(
        "Discovery for operator {operator_id}: {} profile(s) found, {queued} queued",
        found.len()
    );
    Ok(DiscoveryOutcome::Ran {
        discovered: found.len(),
        queued,
    })
}
