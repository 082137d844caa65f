use crate::api_state::ApiContext;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common_services::api::browse::service::spawn_preload;
use common_services::api::operator::error::OperatorError;
use common_services::api::operator::interfaces::{
    DiscoverResponse, DiscoverStatus, FavoritesResponse, SetFilterParams, SetTokenParams,
};
use common_services::api::operator::service::{discover, list_favorites, set_filter, set_token};
use std::sync::Arc;
use tracing::instrument;

/// Replace the operator's search filter; drops the stale queue.
#[utoipa::path(
    put,
    path = "/operators/{operator_id}/filter",
    tag = "Operator",
    params(
        ("operator_id" = i64, Path, description = "Telegram user id of the operator")
    ),
    request_body = SetFilterParams,
    responses(
        (status = 204, description = "Filter replaced"),
        (status = 500, description = "A database or internal error occurred."),
    )
)]
#[instrument(skip(context), err(Debug))]
pub async fn set_filter_handler(
    State(context): State<ApiContext>,
    Path(operator_id): Path<i64>,
    Json(params): Json<SetFilterParams>,
) -> Result<StatusCode, OperatorError> {
    set_filter(&context.pool, operator_id, params).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Store the operator's social-network access token.
#[utoipa::path(
    put,
    path = "/operators/{operator_id}/token",
    tag = "Operator",
    params(
        ("operator_id" = i64, Path, description = "Telegram user id of the operator")
    ),
    request_body = SetTokenParams,
    responses(
        (status = 204, description = "Token stored"),
        (status = 500, description = "A database or internal error occurred."),
    )
)]
#[instrument(skip(context, params), err(Debug))]
pub async fn set_token_handler(
    State(context): State<ApiContext>,
    Path(operator_id): Path<i64>,
    Json(params): Json<SetTokenParams>,
) -> Result<StatusCode, OperatorError> {
    set_token(&context.pool, operator_id, params).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The operator's favorite candidates.
#[utoipa::path(
    get,
    path = "/operators/{operator_id}/favorites",
    tag = "Operator",
    params(
        ("operator_id" = i64, Path, description = "Telegram user id of the operator")
    ),
    responses(
        (status = 200, description = "Favorite candidate ids", body = FavoritesResponse),
        (status = 500, description = "A database or internal error occurred."),
    )
)]
#[instrument(skip(context), err(Debug))]
pub async fn get_favorites_handler(
    State(context): State<ApiContext>,
    Path(operator_id): Path<i64>,
) -> Result<Json<FavoritesResponse>, OperatorError> {
    Ok(Json(list_favorites(&context.pool, operator_id).await?))
}

/// Run one discovery cycle and rebuild the operator's browsing queue.
#[utoipa::path(
    post,
    path = "/operators/{operator_id}/discover",
    tag = "Operator",
    params(
        ("operator_id" = i64, Path, description = "Telegram user id of the operator")
    ),
    responses(
        (status = 200, description = "Discovery outcome", body = DiscoverResponse),
        (status = 502, description = "The social network could not be reached."),
        (status = 500, description = "A database or internal error occurred."),
    )
)]
#[instrument(skip(context), err(Debug))]
pub async fn discover_handler(
    State(context): State<ApiContext>,
    Path(operator_id): Path<i64>,
) -> Result<Json<DiscoverResponse>, OperatorError> {
    let response = discover(&context.pool, context.source.as_ref(), operator_id).await?;
    if response.status == DiscoverStatus::Ran {
        spawn_preload(
            context.pool.clone(),
            Arc::clone(&context.source),
            Arc::clone(&context.processor),
            operator_id,
        );
    }
    Ok(Json(response))
}
