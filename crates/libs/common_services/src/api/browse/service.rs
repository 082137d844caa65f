use crate::api::browse::error::BrowseError;
use crate::api::browse::interfaces::{CandidateCard, CursorResponse, NextCandidateResponse};
use crate::browse::{BrowseEngine, NextOutcome};
use crate::database::OperatorStore;
use crate::discovery::{CandidateProcessor, CandidateSource};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::warn;

pub async fn next_candidate(
    engine: &BrowseEngine,
    operator_id: i64,
) -> Result<NextCandidateResponse, BrowseError> {
    let response = match engine.next_candidate(operator_id).await? {
        NextOutcome::Served(served) => NextCandidateResponse {
            exhausted: false,
            card: Some(CandidateCard::from(served)),
        },
        NextOutcome::Exhausted => NextCandidateResponse {
            exhausted: true,
            card: None,
        },
    };
    Ok(response)
}

pub async fn rewind(
    engine: &BrowseEngine,
    operator_id: i64,
) -> Result<CursorResponse, BrowseError> {
    let card = engine.rewind(operator_id).await?.map(CandidateCard::from);
    Ok(CursorResponse { card })
}

pub async fn advance(
    engine: &BrowseEngine,
    operator_id: i64,
) -> Result<CursorResponse, BrowseError> {
    let card = engine.advance(operator_id).await?.map(CandidateCard::from);
    Ok(CursorResponse { card })
}

pub async fn current_card(
    engine: &BrowseEngine,
    operator_id: i64,
) -> Result<CursorResponse, BrowseError> {
    let card = engine.current_card(operator_id).await?.map(CandidateCard::from);
    Ok(CursorResponse { card })
}

pub async fn favorite(
    engine: &BrowseEngine,
    operator_id: i64,
    candidate_id: i64,
) -> Result<(), BrowseError> {
    Ok(engine.favorite(operator_id, candidate_id).await?)
}

pub async fn unfavorite(
    engine: &BrowseEngine,
    operator_id: i64,
    candidate_id: i64,
) -> Result<(), BrowseError> {
    Ok(engine.unfavorite(operator_id, candidate_id).await?)
}

pub async fn blacklist(
    engine: &BrowseEngine,
    operator_id: i64,
    candidate_id: i64,
) -> Result<(), BrowseError> {
    Ok(engine.blacklist(operator_id, candidate_id).await?)
}

/// Kicks off background preparation of the next queued candidates so the
/// frontier stays ahead of the operator. Fire-and-forget; failures only log.
pub fn spawn_preload(
    pool: SqlitePool,
    source: Arc<dyn CandidateSource>,
    processor: Arc<CandidateProcessor>,
    operator_id: i64,
) {
    tokio::spawn(async move {
        let operator = match OperatorStore::get(&pool, operator_id).await {
            Ok(Some(operator)) => operator,
            Ok(None) => return,
            Err(err) => {
                warn!("Operator {operator_id}: preload lookup failed: {err}");
                return;
            }
        };
        let Some(token) = operator.access_token else {
            return;
        };
        if let Err(err) = processor.preload_ahead(source.as_ref(), &token, operator_id).await {
            warn!("Operator {operator_id}: preload failed: {err}");
        }
    });
}
