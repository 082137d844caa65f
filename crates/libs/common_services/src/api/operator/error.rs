use crate::database::DbError;
use crate::discovery::{DiscoveryError, SourceError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum OperatorError {
    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("social network error")]
    Upstream(#[from] SourceError),

    #[error("internal error")]
    Internal(#[from] eyre::Report),
}

fn log_error(error: &OperatorError) {
    match error {
        OperatorError::Database(e) => error!("Database query failed: {}", e),
        OperatorError::Upstream(e) => error!("Social network call failed: {}", e),
        OperatorError::Internal(e) => error!("Internal error: {}", e),
    }
}

impl IntoResponse for OperatorError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, error_message) = match self {
            Self::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "A database error occurred.".to_string(),
            ),
            Self::Upstream(_) => (
                StatusCode::BAD_GATEWAY,
                "The social network could not be reached.".to_string(),
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

impl From<DbError> for OperatorError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(err) | DbError::Sqlx(err) => Self::Database(err),
            DbError::SerdeJson(err) => Self::Internal(eyre::Report::new(err)),
        }
    }
}

impl From<DiscoveryError> for OperatorError {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::Db(err) => err.into(),
            DiscoveryError::Source(err) => Self::Upstream(err),
        }
    }
}
