use crate::browse::EngineError;
use crate::database::DbError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] eyre::Report),
}

fn log_error(error: &BrowseError) {
    match error {
        BrowseError::Database(e) => error!("Database query failed: {}", e),
        BrowseError::Internal(e) => error!("Internal error: {}", e),
    }
}

impl IntoResponse for BrowseError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, error_message) = match self {
            Self::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "A database error occurred.".to_string(),
            ),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected internal error occurred.".to_string(),
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<DbError> for BrowseError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(err) | DbError::Sqlx(err) => Self::Database(err),
            DbError::SerdeJson(err) => Self::Internal(eyre::Report::new(err)),
        }
    }
}

impl From<EngineError> for BrowseError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Db(err) => err.into(),
            EngineError::CorruptHistory(err) => Self::Internal(eyre::Report::new(err)),
        }
    }
}
