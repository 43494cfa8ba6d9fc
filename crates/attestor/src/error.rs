use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::admin::AdminError;

/// Failure classes for the attestor's API surface
///
/// Every error renders as `{success: false, error}` with a status matching
/// the class; anything unexpected funnels into a generic 500.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A required request field was missing or empty (400)
    #[error("{0}")]
    BadRequest(&'static str),

    /// Token verification failed (401)
    #[error("Invalid token")]
    InvalidToken,

    /// The requested account does not exist (404)
    #[error("User not found")]
    NotFound,

    /// An upstream admin call failed (500)
    #[error("{0}")]
    Upstream(String),

    /// Catch-all (500)
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Unhandled error: {}", self);
        }
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::NotFound => ApiError::NotFound,
            other => ApiError::Upstream(other.to_string()),
        }
    }
}
