use crate::api_state::ApiContext;
use crate::operator::handlers::{
    discover_handler, get_favorites_handler, set_filter_handler, set_token_handler,
};
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn operator_router() -> Router<ApiContext> {
    Router::new()
        .route("/operators/{operator_id}/filter", put(set_filter_handler))
        .route("/operators/{operator_id}/token", put(set_token_handler))
        .route("/operators/{operator_id}/favorites", get(get_favorites_handler))
        .route("/operators/{operator_id}/discover", post(discover_handler))
}
