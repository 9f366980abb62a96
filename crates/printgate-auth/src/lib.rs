//! # printgate-auth
//!
//! Authentication and authorization for the PrintGate job service.
//!
//! This crate provides:
//! - Argon2 password verification against an in-memory credential store
//! - Role catalogs with inheritance, resolved once into permission sets
//! - Opaque server-side sessions with expiry and revocation
//! - The access controller that gates every queue operation
//!
//! ## Modules
//!
//! - [`config`] - Authentication and authorization configuration
//! - [`credentials`] - Credential store contract and in-memory implementation
//! - [`password`] - Argon2 password hashing and verification
//! - [`policy`] - Role catalog and permission resolution
//! - [`session`] - Session issue, validation, revocation and sweeping
//! - [`access`] - Authenticate/authorize composition
//! - [`middleware`] - Axum extractors and error responses

pub mod access;
pub mod config;
pub mod credentials;
pub mod error;
pub mod middleware;
pub mod operation;
pub mod password;
pub mod policy;
pub mod session;

pub use access::{AccessController, Principal};
pub use config::{AuthConfig, ConfigError};
pub use credentials::{CredentialStore, InMemoryCredentialStore};
pub use error::{AuthError, ErrorCategory};
pub use middleware::{AuthState, BearerToken, OptionalBearerToken};
pub use operation::Operation;
pub use policy::{PolicyEngine, Role, RoleCatalog};
pub use session::{DEFAULT_SESSION_TTL, Session, SessionManager};

/// Type alias for authentication/authorization results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use printgate_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::access::{AccessController, Principal};
    pub use crate::config::{AuthConfig, ConfigError};
    pub use crate::credentials::{CredentialStore, InMemoryCredentialStore};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::middleware::{AuthState, BearerToken, OptionalBearerToken};
    pub use crate::operation::Operation;
    pub use crate::policy::{PolicyEngine, Role, RoleCatalog};
    pub use crate::session::{Session, SessionManager};
}
