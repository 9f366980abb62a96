//! Authentication and authorization error types.
//!
//! Every rejected request maps to exactly one variant so that clients can
//! tell "log in again" apart from "you lack permission".

use std::fmt;

/// Errors that can occur during authentication and authorization operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The supplied credentials did not match.
    ///
    /// Deliberately carries no detail: the caller must not learn whether the
    /// username exists.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The session token is missing, unknown, malformed, revoked or expired.
    #[error("Invalid or expired session")]
    InvalidOrExpiredSession,

    /// The session is valid but the caller's role does not grant the operation.
    #[error("Unauthorized: role does not grant '{operation}'")]
    Unauthorized {
        /// The operation that was refused.
        operation: String,
    },

    /// A role referenced by configuration or a user assignment is not defined.
    #[error("Role not found: {role}")]
    RoleNotFound {
        /// The missing role name.
        role: String,
    },

    /// A session refers to a user that the credential store does not know.
    #[error("User not found: {username}")]
    UserNotFound {
        /// The missing username.
        username: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `Unauthorized` error.
    #[must_use]
    pub fn unauthorized(operation: impl Into<String>) -> Self {
        Self::Unauthorized {
            operation: operation.into(),
        }
    }

    /// Creates a new `RoleNotFound` error.
    #[must_use]
    pub fn role_not_found(role: impl Into<String>) -> Self {
        Self::RoleNotFound { role: role.into() }
    }

    /// Creates a new `UserNotFound` error.
    #[must_use]
    pub fn user_not_found(username: impl Into<String>) -> Self {
        Self::UserNotFound {
            username: username.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed | Self::InvalidOrExpiredSession | Self::Unauthorized { .. }
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    ///
    /// Missing roles and users can only arise from inconsistent
    /// configuration, so they count as server errors.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// Returns `true` if the caller should log in again.
    #[must_use]
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed | Self::InvalidOrExpiredSession
        )
    }

    /// Returns `true` if this is a permission failure.
    #[must_use]
    pub fn is_authorization_error(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AuthenticationFailed => ErrorCategory::Authentication,
            Self::InvalidOrExpiredSession => ErrorCategory::Session,
            Self::Unauthorized { .. } => ErrorCategory::Authorization,
            Self::RoleNotFound { .. } => ErrorCategory::Configuration,
            Self::UserNotFound { .. } => ErrorCategory::Configuration,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the stable, machine-readable error kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::InvalidOrExpiredSession => "invalid_or_expired_session",
            Self::Unauthorized { .. } => "unauthorized",
            Self::RoleNotFound { .. } => "role_not_found",
            Self::UserNotFound { .. } => "user_not_found",
            Self::Configuration { .. } => "configuration_error",
            Self::Internal { .. } => "internal_error",
        }
    }
}

/// Categories of authentication/authorization errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Credential verification failures.
    Authentication,
    /// Session validation failures.
    Session,
    /// Permission checks.
    Authorization,
    /// Inconsistent policy or credential configuration.
    Configuration,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Session => write!(f, "session"),
            Self::Authorization => write!(f, "authorization"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            AuthError::AuthenticationFailed.to_string(),
            "Authentication failed"
        );
        assert_eq!(
            AuthError::unauthorized("submit").to_string(),
            "Unauthorized: role does not grant 'submit'"
        );
        assert_eq!(
            AuthError::role_not_found("Janitor").to_string(),
            "Role not found: Janitor"
        );
    }

    #[test]
    fn test_error_predicates() {
        let err = AuthError::AuthenticationFailed;
        assert!(err.is_client_error());
        assert!(err.is_authentication_error());
        assert!(!err.is_authorization_error());

        let err = AuthError::unauthorized("restart");
        assert!(err.is_client_error());
        assert!(!err.is_authentication_error());
        assert!(err.is_authorization_error());

        let err = AuthError::user_not_found("ghost");
        assert!(err.is_server_error());
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            AuthError::AuthenticationFailed,
            AuthError::InvalidOrExpiredSession,
            AuthError::unauthorized("x"),
            AuthError::role_not_found("x"),
            AuthError::user_not_found("x"),
            AuthError::configuration("x"),
            AuthError::internal("x"),
        ];
        let codes: std::collections::HashSet<_> = errors.iter().map(AuthError::code).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            AuthError::InvalidOrExpiredSession.category(),
            ErrorCategory::Session
        );
        assert_eq!(
            AuthError::role_not_found("x").category(),
            ErrorCategory::Configuration
        );
        assert_eq!(ErrorCategory::Authorization.to_string(), "authorization");
    }
}
