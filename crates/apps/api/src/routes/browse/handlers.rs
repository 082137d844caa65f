use crate::api_state::ApiContext;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common_services::api::browse::error::BrowseError;
use common_services::api::browse::interfaces::{CursorResponse, NextCandidateResponse};
use common_services::api::browse::service::{
    advance, blacklist, current_card, favorite, next_candidate, rewind, spawn_preload, unfavorite,
};
use std::sync::Arc;
use tracing::instrument;

/// Serve the next candidate for the operator, replaying history first.
#[utoipa::path(
    post,
    path = "/browse/{operator_id}/next",
    tag = "Browse",
    params(
        ("operator_id" = i64, Path, description = "Telegram user id of the operator")
    ),
    responses(
        (status = 200, description = "The next candidate, or an exhaustion marker", body = NextCandidateResponse),
        (status = 500, description = "A database or internal error occurred."),
    )
)]
#[instrument(skip(context), err(Debug))]
pub async fn next_candidate_handler(
    State(context): State<ApiContext>,
    Path(operator_id): Path<i64>,
) -> Result<Json<NextCandidateResponse>, BrowseError> {
    let response = next_candidate(&context.engine, operator_id).await?;
    spawn_preload(
        context.pool.clone(),
        Arc::clone(&context.source),
        Arc::clone(&context.processor),
        operator_id,
    );
    Ok(Json(response))
}

/// The card currently under the operator's cursor.
#[utoipa::path(
    get,
    path = "/browse/{operator_id}/current",
    tag = "Browse",
    params(
        ("operator_id" = i64, Path, description = "Telegram user id of the operator")
    ),
    responses(
        (status = 200, description = "The current card, absent when nothing was consumed yet", body = CursorResponse),
        (status = 500, description = "A database or internal error occurred."),
    )
)]
#[instrument(skip(context), err(Debug))]
pub async fn current_card_handler(
    State(context): State<ApiContext>,
    Path(operator_id): Path<i64>,
) -> Result<Json<CursorResponse>, BrowseError> {
    Ok(Json(current_card(&context.engine, operator_id).await?))
}

/// Move the cursor one history entry back.
#[utoipa::path(
    post,
    path = "/browse/{operator_id}/rewind",
    tag = "Browse",
    params(
        ("operator_id" = i64, Path, description = "Telegram user id of the operator")
    ),
    responses(
        (status = 200, description = "The card now under the cursor", body = CursorResponse),
        (status = 500, description = "A database or internal error occurred."),
    )
)]
#[instrument(skip(context), err(Debug))]
pub async fn rewind_handler(
    State(context): State<ApiContext>,
    Path(operator_id): Path<i64>,
) -> Result<Json<CursorResponse>, BrowseError> {
    Ok(Json(rewind(&context.engine, operator_id).await?))
}

/// Move the cursor one history entry forward, never past the head.
#[utoipa::path(
    post,
    path = "/browse/{operator_id}/advance",
    tag = "Browse",
    params(
        ("operator_id" = i64, Path, description = "Telegram user id of the operator")
    ),
    responses(
        (status = 200, description = "The card now under the cursor", body = CursorResponse),
        (status = 500, description = "A database or internal error occurred."),
    )
)]
#[instrument(skip(context), err(Debug))]
pub async fn advance_handler(
    State(context): State<ApiContext>,
    Path(operator_id): Path<i64>,
) -> Result<Json<CursorResponse>, BrowseError> {
    Ok(Json(advance(&context.engine, operator_id).await?))
}

/// Mark a candidate as a favorite of the operator.
#[utoipa::path(
    post,
    path = "/browse/{operator_id}/candidates/{candidate_id}/favorite",
    tag = "Browse",
    params(
        ("operator_id" = i64, Path, description = "Telegram user id of the operator"),
        ("candidate_id" = i64, Path, description = "Remote id of the candidate"),
    ),
    responses(
        (status = 204, description = "Favorite recorded"),
        (status = 500, description = "A database or internal error occurred."),
    )
)]
#[instrument(skip(context), err(Debug))]
pub async fn favorite_handler(
    State(context): State<ApiContext>,
    Path((operator_id, candidate_id)): Path<(i64, i64)>,
) -> Result<StatusCode, BrowseError> {
    favorite(&context.engine, operator_id, candidate_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a candidate from the operator's favorites.
#[utoipa::path(
    delete,
    path = "/browse/{operator_id}/candidates/{candidate_id}/favorite",
    tag = "Browse",
    params(
        ("operator_id" = i64, Path, description = "Telegram user id of the operator"),
        ("candidate_id" = i64, Path, description = "Remote id of the candidate"),
    ),
    responses(
        (status = 204, description = "Favorite removed"),
        (status = 500, description = "A database or internal error occurred."),
    )
)]
#[instrument(skip(context), err(Debug))]
pub async fn unfavorite_handler(
    State(context): State<ApiContext>,
    Path((operator_id, candidate_id)): Path<(i64, i64)>,
) -> Result<StatusCode, BrowseError> {
    unfavorite(&context.engine, operator_id, candidate_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Exclude a candidate from all future serves for this operator.
#[utoipa::path(
    post,
    path = "/browse/{operator_id}/candidates/{candidate_id}/blacklist",
    tag = "Browse",
    params(
        ("operator_id" = i64, Path, description = "Telegram user id of the operator"),
        ("candidate_id" = i64, Path, description = "Remote id of the candidate"),
    ),
    responses(
        (status = 204, description = "Candidate blacklisted"),
        (status = 500, description = "A database or internal error occurred."),
    )
)]
#[instrument(skip(context), err(Debug))]
pub async fn blacklist_handler(
    State(context): State<ApiContext>,
    Path((operator_id, candidate_id)): Path<(i64, i64)>,
) -> Result<StatusCode, BrowseError> {
    blacklist(&context.engine, operator_id, candidate_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
