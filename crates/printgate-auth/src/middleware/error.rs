//! Error responses for authentication and authorization failures.
//!
//! Bodies are `{"error": "<code>", "message": "<text>"}`. Server-side
//! failures are reported with a generic message; the detail goes to the log.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AuthError;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = status_code(&self);

        let message = if self.is_server_error() {
            tracing::error!(error = %self, category = %self.category(), "Auth request failed server-side");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let mut headers = HeaderMap::new();
        if status == StatusCode::UNAUTHORIZED {
            let www_auth = build_www_authenticate_header(self.code(), &message);
            if let Ok(value) = HeaderValue::from_str(&www_auth) {
                headers.insert(header::WWW_AUTHENTICATE, value);
            }
        }

        (status, headers, Json(error_body(self.code(), &message))).into_response()
    }
}

fn status_code(error: &AuthError) -> StatusCode {
    if error.is_authentication_error() {
        StatusCode::UNAUTHORIZED
    } else if error.is_authorization_error() {
        StatusCode::FORBIDDEN
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Builds the WWW-Authenticate header value for 401 responses.
///
/// Format: `Bearer realm="printgate", error="...", error_description="..."`
fn build_www_authenticate_header(error: &str, description: &str) -> String {
    let escaped_desc = description.replace('"', "\\\"");
    format!("Bearer realm=\"printgate\", error=\"{error}\", error_description=\"{escaped_desc}\"")
}

/// The JSON error body shared by every rejected request.
#[must_use]
pub fn error_body(code: &str, message: &str) -> serde_json::Value {
    json!({
        "error": code,
        "message": message,
    })
}
