//! Error types for the control API.
//!
//! [`ApiError`] can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Engine
//! refusals map onto it with `From`, so handlers can use `?`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use terra_core::catalog::ModelSelectError;
use terra_core::processor::Rejection;

/// Errors that can occur in the control API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request is invalid and will never succeed as sent.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request conflicts with a command that is in flight.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<Rejection> for ApiError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Blank => Self::BadRequest(rejection.to_string()),
            Rejection::Busy => Self::Conflict(rejection.to_string()),
        }
    }
}

impl From<ModelSelectError> for ApiError {
    fn from(e: ModelSelectError) -> Self {
        match e {
            ModelSelectError::Unknown(_) | ModelSelectError::Disabled(_) => {
                Self::BadRequest(e.to_string())
            }
            ModelSelectError::Busy => Self::Conflict(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
