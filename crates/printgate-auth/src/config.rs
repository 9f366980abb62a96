//! Authentication and authorization configuration.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::policy::RoleCatalog;
use crate::session::DEFAULT_SESSION_TTL;

/// Root authentication and authorization configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth.session]
/// ttl = "30m"
/// sweep_interval = "1m"
///
/// [auth.policy]
/// path = "policy.json"
///
/// [[auth.users]]
/// username = "alice"
/// password = "password123"
/// role = "Admin"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Session lifetime settings.
    pub session: SessionConfig,

    /// Role catalog source.
    pub policy: PolicyConfig,

    /// Users provisioned at startup.
    pub users: Vec<UserConfig>,
}

/// Session lifetime settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long a session stays valid after login.
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,

    /// How often the background sweep evicts expired sessions.
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_SESSION_TTL,
            sweep_interval: Duration::from_secs(60),
        }
    }
}

/// Role catalog source.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Path to a JSON role catalog. The built-in catalog is used when unset.
    pub path: Option<PathBuf>,
}

impl PolicyConfig {
    /// Loads the configured catalog, or the built-in one when no path is set.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the file cannot be read or parsed.
    pub fn load_catalog(&self) -> AuthResult<RoleCatalog> {
        match &self.path {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading role catalog");
                RoleCatalog::from_path(path)
            }
            None => RoleCatalog::builtin(),
        }
    }
}

/// A user provisioned at startup.
#[derive(Clone, Deserialize, Serialize)]
pub struct UserConfig {
    /// Login name.
    pub username: String,
    /// Password in plain text; hashed with a fresh salt on load.
    /// Prefer supplying it through the environment.
    pub password: String,
    /// Role name from the catalog.
    pub role: String,
}

impl std::fmt::Debug for UserConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The session TTL or sweep interval is zero
    /// - A user has an empty username, password or role
    /// - A username appears twice
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.ttl.is_zero() {
            return Err(ConfigError::InvalidValue(
                "session ttl must be > 0".to_string(),
            ));
        }

        if self.session.sweep_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "session sweep_interval must be > 0".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for user in &self.users {
            if user.username.trim().is_empty() {
                return Err(ConfigError::Missing("users[].username".to_string()));
            }
            if user.password.is_empty() {
                return Err(ConfigError::Missing(format!(
                    "password for user '{}'",
                    user.username
                )));
            }
            if user.role.trim().is_empty() {
                return Err(ConfigError::Missing(format!(
                    "role for user '{}'",
                    user.username
                )));
            }
            if !seen.insert(user.username.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "duplicate user '{}'",
                    user.username
                )));
            }
        }

        Ok(())
    }
}
