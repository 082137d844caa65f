mod api_doc;
pub mod browse;
pub mod operator;
pub mod root;

use crate::api_state::ApiContext;
use crate::browse::router::browse_router;
use crate::operator::router::operator_router;
use crate::root::router::root_router;
use crate::routes::api_doc::ApiDoc;
use axum::{Json, Router, routing::get};
use utoipa::OpenApi;

pub fn create_router(api_state: ApiContext) -> Router {
    Router::new()
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(root_router())
        .merge(browse_router())
        .merge(operator_router())
        .with_state(api_state)
}
