//! HTTP glue for authentication and authorization.
//!
//! - [`auth`] - the bearer token extractor and the shared [`AuthState`]
//! - [`error`] - `IntoResponse` for [`AuthError`](crate::AuthError)
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use printgate_auth::Operation;
//! use printgate_auth::middleware::{AuthState, BearerToken};
//!
//! async fn status(
//!     State(auth): State<AuthState>,
//!     BearerToken(token): BearerToken,
//! ) -> Result<String, AuthError> {
//!     let principal = auth.authorize(&token, Operation::Status).await?;
//!     Ok(format!("Hello, {}!", principal.username))
//! }
//! ```

pub mod auth;
pub mod error;

pub use auth::{AuthState, BearerToken, OptionalBearerToken};
pub use error::error_body;
