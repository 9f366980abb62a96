//! HTTP error responses.
//!
//! Every rejected request carries `{"error": "<code>", "message": "<text>"}`
//! so that clients can tell "log in again" from "you lack permission" from
//! "that printer or job does not exist".

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use printgate_auth::AuthError;
use printgate_auth::middleware::error_body;
use printgate_queue::QueueError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Auth(err) => err.into_response(),
            Self::Queue(err) => {
                let status = if err.is_not_found() {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::SERVICE_UNAVAILABLE
                };
                (status, Json(error_body(err.code(), &err.to_string()))).into_response()
            }
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(error_body("invalid_request", &message)),
            )
                .into_response(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
