//! Bearer token extraction.
//!
//! The extractors only pull the token out of the request. Whether it names a
//! live session, and whether that session may run the handler's operation,
//! is decided by [`AuthState::authorize`] once the handler knows which
//! operation it performs.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::AuthResult;
use crate::access::{AccessController, Principal};
use crate::error::AuthError;
use crate::operation::Operation;

// =============================================================================
// Auth State
// =============================================================================

/// State required by authenticated handlers.
///
/// Include it in the application state and expose it with `FromRef`.
#[derive(Clone)]
pub struct AuthState {
    /// The access controller every gated operation passes through.
    pub access: Arc<AccessController>,
}

impl AuthState {
    /// Creates a new auth state.
    pub fn new(access: Arc<AccessController>) -> Self {
        Self { access }
    }

    /// Authorizes `operation` for the session named by `token`.
    ///
    /// # Errors
    ///
    /// See [`AccessController::authorize`].
    pub async fn authorize(&self, token: &str, operation: Operation) -> AuthResult<Principal> {
        self.access.authorize(token, operation).await
    }
}

// =============================================================================
// Bearer Token Extractors
// =============================================================================

/// The token from an `Authorization: Bearer <token>` header.
///
/// # Errors
///
/// Rejects with `InvalidOrExpiredSession` when the header is missing,
/// not a bearer credential, or empty.
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match bearer_token(parts) {
            Some(token) => Ok(BearerToken(token)),
            None => {
                tracing::debug!("Missing or malformed Authorization header");
                Err(AuthError::InvalidOrExpiredSession)
            }
        }
    }
}

/// Like [`BearerToken`] but never rejects.
///
/// Used by logout, which succeeds whether or not the caller has a session.
pub struct OptionalBearerToken(pub Option<String>);

impl<S> FromRequestParts<S> for OptionalBearerToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalBearerToken(bearer_token(parts)))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/printers/p1/jobs");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_extracts_bearer_token() {
        let mut parts = parts(Some("Bearer abc123"));
        let BearerToken(token) = BearerToken::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(token, "abc123");
    }

    #[tokio::test]
    async fn test_scheme_is_case_insensitive() {
        let mut parts = parts(Some("bearer abc123"));
        assert!(BearerToken::from_request_parts(&mut parts, &()).await.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_missing_or_malformed_header() {
        for header in [None, Some("Basic dXNlcjpwdw=="), Some("Bearer "), Some("Bearer")] {
            let mut parts = parts(header);
            let result = BearerToken::from_request_parts(&mut parts, &()).await;
            assert!(
                matches!(result, Err(AuthError::InvalidOrExpiredSession)),
                "header {header:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_optional_token_never_rejects() {
        let mut missing = parts(None);
        let OptionalBearerToken(token) =
            OptionalBearerToken::from_request_parts(&mut missing, &()).await.unwrap();
        assert!(token.is_none());

        let mut present = parts(Some("Bearer xyz"));
        let OptionalBearerToken(token) =
            OptionalBearerToken::from_request_parts(&mut present, &()).await.unwrap();
        assert_eq!(token.as_deref(), Some("xyz"));
    }
}
