//! Credential store.
//!
//! Verifies username/password pairs against Argon2 hashes and resolves the
//! role assigned to each user. Credentials never leave this module; callers
//! only see a boolean verdict or a role name.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::AuthResult;
use crate::error::AuthError;
use crate::password;

/// A stored credential. Not exported: the hash stays private.
#[derive(Clone)]
struct Credential {
    /// Argon2id hash in PHC format; carries its own salt.
    password_hash: String,
    role: String,
}

/// Storage contract for user credentials and role assignments.
///
/// # Security
///
/// `verify` must not reveal whether a username exists: an unknown user and a
/// wrong password both yield `false`.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Checks a username/password pair.
    async fn verify(&self, username: &str, password: &str) -> bool;

    /// Returns the role assigned to a user.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the user is not provisioned.
    async fn role_of(&self, username: &str) -> AuthResult<String>;

    /// Lists every `(username, role)` assignment.
    ///
    /// Used at startup to check that each assigned role exists in the policy.
    async fn role_assignments(&self) -> AuthResult<Vec<(String, String)>>;
}

/// In-memory credential store populated at provisioning time.
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, Credential>>,
    // Verified against for unknown users so both failure paths cost the same.
    decoy_hash: String,
}

impl InMemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        let decoy_hash = password::hash_password("decoy").unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to hash decoy password");
            String::new()
        });
        Self {
            users: RwLock::new(HashMap::new()),
            decoy_hash,
        }
    }

    /// Provisions (or replaces) a user. The password is hashed with a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty username, password or role,
    /// or `Internal` if hashing fails.
    pub fn provision(
        &self,
        username: impl Into<String>,
        password: &str,
        role: impl Into<String>,
    ) -> AuthResult<()> {
        let username = username.into();
        let role = role.into();
        if username.trim().is_empty() {
            return Err(AuthError::configuration("username must not be empty"));
        }
        if password.is_empty() {
            return Err(AuthError::configuration(format!(
                "password for user '{username}' must not be empty"
            )));
        }
        if role.trim().is_empty() {
            return Err(AuthError::configuration(format!(
                "role for user '{username}' must not be empty"
            )));
        }

        let credential = Credential {
            password_hash: password::hash_password(password)?,
            role,
        };
        tracing::info!(username = %username, role = %credential.role, "Provisioned user");
        self.users.write().insert(username, credential);
        Ok(())
    }

    /// Resets a user's password. A new salt is generated.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the user does not exist, or a configuration
    /// error for an empty password.
    pub fn set_password(&self, username: &str, password: &str) -> AuthResult<()> {
        if password.is_empty() {
            return Err(AuthError::configuration("password must not be empty"));
        }
        let password_hash = password::hash_password(password)?;
        let mut users = self.users.write();
        let credential = users
            .get_mut(username)
            .ok_or_else(|| AuthError::user_not_found(username))?;
        credential.password_hash = password_hash;
        tracing::info!(username = %username, "Password reset");
        Ok(())
    }

    /// Number of provisioned users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    /// Returns `true` if no users are provisioned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn verify(&self, username: &str, password: &str) -> bool {
        let stored = self
            .users
            .read()
            .get(username)
            .map(|c| c.password_hash.clone());

        match stored {
            Some(hash) => {
                let verified = password::verify_password(password, &hash).unwrap_or_else(|e| {
                    tracing::error!(username = %username, error = %e, "Password verification failed");
                    false
                });
                tracing::debug!(
                    username = %username,
                    verified,
                    "Password verification"
                );
                verified
            }
            None => {
                let _ = password::verify_password(password, &self.decoy_hash);
                tracing::debug!(username = %username, "Password verification for unknown user");
                false
            }
        }
    }

    async fn role_of(&self, username: &str) -> AuthResult<String> {
        self.users
            .read()
            .get(username)
            .map(|c| c.role.clone())
            .ok_or_else(|| AuthError::user_not_found(username))
    }

    async fn role_assignments(&self) -> AuthResult<Vec<(String, String)>> {
        let mut assignments: Vec<_> = self
            .users
            .read()
            .iter()
            .map(|(user, c)| (user.clone(), c.role.clone()))
            .collect();
        assignments.sort();
        Ok(assignments)
    }
}
