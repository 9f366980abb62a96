//! Access controller: the gate every operation passes before it runs.
//!
//! Composes the credential store, the session manager and the policy engine.
//! Holds no state of its own.

use std::sync::Arc;

use crate::AuthResult;
use crate::config::AuthConfig;
use crate::credentials::{CredentialStore, InMemoryCredentialStore};
use crate::error::AuthError;
use crate::operation::Operation;
use crate::policy::PolicyEngine;
use crate::session::{Session, SessionManager, token_hint};

/// The caller of an authorized operation.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    /// Authenticated username.
    pub username: String,
    /// The user's role.
    pub role: String,
    /// The session token the call was made with.
    pub token: String,
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("username", &self.username)
            .field("role", &self.role)
            .field("token", &format_args!("{}…", token_hint(&self.token)))
            .finish()
    }
}

/// Authenticates users and authorizes their operations.
pub struct AccessController {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<SessionManager>,
    policy: Arc<PolicyEngine>,
}

impl AccessController {
    /// Creates a controller and checks that every user's role is defined.
    ///
    /// # Errors
    ///
    /// Returns `RoleNotFound` if a user is assigned a role the policy does
    /// not define. This is a startup-time configuration failure.
    pub async fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<SessionManager>,
        policy: Arc<PolicyEngine>,
    ) -> AuthResult<Self> {
        for (username, role) in credentials.role_assignments().await? {
            if !policy.contains_role(&role) {
                tracing::error!(username = %username, role = %role, "User assigned to undefined role");
                return Err(AuthError::role_not_found(role));
            }
        }

        Ok(Self {
            credentials,
            sessions,
            policy,
        })
    }

    /// Builds a controller from configuration: loads the role catalog,
    /// resolves it and provisions the configured users.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for an unreadable catalog, `RoleNotFound` for
    /// an inheritance or assignment naming an undefined role.
    pub async fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        let catalog = config.policy.load_catalog()?;
        let policy = PolicyEngine::from_catalog(&catalog)?;

        let store = InMemoryCredentialStore::new();
        for user in &config.users {
            store.provision(&user.username, &user.password, &user.role)?;
        }
        if store.is_empty() {
            tracing::warn!("No users configured; nobody can log in");
        }

        Self::new(
            Arc::new(store),
            Arc::new(SessionManager::new(config.session.ttl)),
            Arc::new(policy),
        )
        .await
    }

    /// The session manager backing this controller.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// The resolved policy.
    #[must_use]
    pub fn policy(&self) -> &Arc<PolicyEngine> {
        &self.policy
    }

    /// Verifies credentials and opens a session.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationFailed` for an unknown user or a wrong password,
    /// without saying which.
    pub async fn authenticate(&self, username: &str, password: &str) -> AuthResult<Session> {
        if !self.credentials.verify(username, password).await {
            tracing::warn!(username = %username, "Login failed");
            return Err(AuthError::AuthenticationFailed);
        }

        let session = self.sessions.create(username);
        tracing::info!(username = %username, token = %session.token_hint(), "User logged in");
        Ok(session)
    }

    /// Checks that `token` names a live session whose role grants `operation`.
    ///
    /// # Errors
    ///
    /// - `InvalidOrExpiredSession` if the token is not a live session
    /// - `UserNotFound` / `RoleNotFound` if configuration is inconsistent
    /// - `Unauthorized` if the role does not grant the operation
    pub async fn authorize(&self, token: &str, operation: Operation) -> AuthResult<Principal> {
        let session = self
            .sessions
            .validate(token)
            .ok_or(AuthError::InvalidOrExpiredSession)?;

        let role = self.credentials.role_of(&session.username).await?;

        if !self.policy.is_permitted(&role, operation)? {
            tracing::warn!(
                username = %session.username,
                role = %role,
                operation = %operation,
                "Operation denied"
            );
            return Err(AuthError::unauthorized(operation.as_str()));
        }

        tracing::debug!(
            username = %session.username,
            role = %role,
            operation = %operation,
            "Operation authorized"
        );
        Ok(Principal {
            username: session.username,
            role,
            token: session.token,
        })
    }

    /// Ends a session. Idempotent.
    pub fn logout(&self, token: &str) {
        if self.sessions.revoke(token) {
            tracing::info!(token = %token_hint(token), "User logged out");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::UserConfig;
    use crate::policy::{Role, RoleCatalog};

    async fn controller() -> AccessController {
        let catalog = RoleCatalog::new()
            .with_role(
                "User",
                Role::new()
                    .with_permission("status")
                    .with_permission("readConfig"),
            )
            .with_role(
                "Technician",
                Role::new().with_permission("restart").inherits_from("User"),
            );
        let store = InMemoryCredentialStore::new();
        store.provision("bob", "password123", "Technician").unwrap();
        store.provision("david", "password123", "User").unwrap();

        AccessController::new(
            Arc::new(store),
            Arc::new(SessionManager::default()),
            Arc::new(PolicyEngine::from_catalog(&catalog).unwrap()),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_authenticate_and_authorize() {
        let access = controller().await;
        let session = access.authenticate("bob", "password123").await.unwrap();

        let principal = access
            .authorize(&session.token, Operation::Restart)
            .await
            .unwrap();
        assert_eq!(principal.username, "bob");
        assert_eq!(principal.role, "Technician");
        assert_eq!(principal.token, session.token);

        assert!(access.authorize(&session.token, Operation::Status).await.is_ok());
        assert!(access.authorize(&session.token, Operation::ReadConfig).await.is_ok());
    }

    #[tokio::test]
    async fn test_technician_cannot_submit() {
        let access = controller().await;
        let session = access.authenticate("bob", "password123").await.unwrap();

        let err = access
            .authorize(&session.token, Operation::Submit)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized { ref operation } if operation == "submit"));
    }

    #[tokio::test]
    async fn test_bad_credentials_look_the_same() {
        let access = controller().await;
        let wrong_password = access.authenticate("bob", "nope").await.unwrap_err();
        let unknown_user = access.authenticate("mallory", "password123").await.unwrap_err();

        assert_eq!(wrong_password.code(), "authentication_failed");
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert_eq!(access.sessions().active_count(), 0);
    }

    #[tokio::test]
    async fn test_logout_invalidates_token() {
        let access = controller().await;
        let session = access.authenticate("david", "password123").await.unwrap();
        access.logout(&session.token);
        access.logout(&session.token);

        let err = access
            .authorize(&session.token, Operation::Status)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidOrExpiredSession));
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let catalog = RoleCatalog::new().with_role("User", Role::new().with_permission("status"));
        let store = InMemoryCredentialStore::new();
        store.provision("david", "pw", "User").unwrap();
        let access = AccessController::new(
            Arc::new(store),
            Arc::new(SessionManager::new(Duration::ZERO)),
            Arc::new(PolicyEngine::from_catalog(&catalog).unwrap()),
        )
        .await
        .unwrap();

        let session = access.authenticate("david", "pw").await.unwrap();
        let err = access
            .authorize(&session.token, Operation::Status)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidOrExpiredSession));
    }

    #[tokio::test]
    async fn test_undefined_role_assignment_fails_startup() {
        let store = InMemoryCredentialStore::new();
        store.provision("eve", "pw", "Janitor").unwrap();
        let result = AccessController::new(
            Arc::new(store),
            Arc::new(SessionManager::default()),
            Arc::new(PolicyEngine::from_catalog(&RoleCatalog::builtin().unwrap()).unwrap()),
        )
        .await;
        assert!(matches!(result, Err(AuthError::RoleNotFound { ref role }) if role == "Janitor"));
    }

    #[tokio::test]
    async fn test_from_config_with_builtin_catalog() {
        let config = AuthConfig {
            users: vec![UserConfig {
                username: "cecilia".to_string(),
                password: "password123".to_string(),
                role: "PowerUser".to_string(),
            }],
            ..Default::default()
        };
        let access = AccessController::from_config(&config).await.unwrap();
        let session = access.authenticate("cecilia", "password123").await.unwrap();

        assert!(access.authorize(&session.token, Operation::Promote).await.is_ok());
        assert!(access.authorize(&session.token, Operation::Submit).await.is_ok());
        assert!(access.authorize(&session.token, Operation::Stop).await.is_err());
    }
}
