use app_state::AppSettings;
use axum::extract::FromRef;
use common_services::browse::BrowseEngine;
use common_services::discovery::{CandidateProcessor, CandidateSource};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiContext {
    pub pool: SqlitePool,
    pub settings: AppSettings,
    pub engine: Arc<BrowseEngine>,
    pub processor: Arc<CandidateProcessor>,
    pub source: Arc<dyn CandidateSource>,
}

// These impls let extractors pull just the part of the state they need.
impl FromRef<ApiContext> for SqlitePool {
    fn from_ref(state: &ApiContext) -> Self {
        state.pool.clone()
    }
}

impl FromRef<ApiContext> for AppSettings {
    fn from_ref(state: &ApiContext) -> Self {
        state.settings.clone()
    }
}
