use crate::api_state::ApiContext;
use crate::browse::handlers::{
    advance_handler, blacklist_handler, current_card_handler, favorite_handler,
    next_candidate_handler, rewind_handler, unfavorite_handler,
};
use axum::{
    Router,
    routing::{get, post},
};

pub fn browse_router() -> Router<ApiContext> {
    Router::new()
        .route("/browse/{operator_id}/next", post(next_candidate_handler))
        .route("/browse/{operator_id}/current", get(current_card_handler))
        .route("/browse/{operator_id}/rewind", post(rewind_handler))
        .route("/browse/{operator_id}/advance", post(advance_handler))
        .route(
            "/browse/{operator_id}/candidates/{candidate_id}/favorite",
            post(favorite_handler).delete(unfavorite_handler),
        )
        .route(
            "/browse/{operator_id}/candidates/{candidate_id}/blacklist",
            post(blacklist_handler),
        )
}
