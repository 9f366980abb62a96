//! Role catalog loaded from configuration.
//!
//! The catalog is a JSON document of the form:
//!
//! ```json
//! {
//!   "roles": {
//!     "User":       { "permissions": ["submit", "listQueue"] },
//!     "Technician": { "permissions": ["restart"], "inherits": "User" },
//!     "Admin":      { "inherits": ["PowerUser", "Technician"] }
//!   }
//! }
//! ```
//!
//! `inherits` may be a single role name or a list of names.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::AuthResult;
use crate::error::AuthError;

const BUILTIN_CATALOG: &str = include_str!("../../resources/policy.json");

// =============================================================================
// Role
// =============================================================================

/// A role definition: direct permissions plus the roles it inherits from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Permissions granted directly by this role.
    #[serde(default)]
    pub permissions: BTreeSet<String>,

    /// Roles whose permissions are inherited, in declaration order.
    #[serde(default, deserialize_with = "one_or_many")]
    pub inherits: Vec<String>,
}

impl Role {
    /// Creates a role with no permissions and no parents.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a direct permission.
    #[must_use]
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    /// Adds a parent role.
    #[must_use]
    pub fn inherits_from(mut self, role: impl Into<String>) -> Self {
        self.inherits.push(role.into());
        self
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(role) => vec![role],
        OneOrMany::Many(roles) => roles,
    })
}

// =============================================================================
// Catalog
// =============================================================================

/// All roles known to the service, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCatalog {
    /// Role definitions by name.
    pub roles: BTreeMap<String, Role>,
}

impl RoleCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a role.
    #[must_use]
    pub fn with_role(mut self, name: impl Into<String>, role: Role) -> Self {
        self.roles.insert(name.into(), role);
        self
    }

    /// The catalog shipped with the server: `User`, `PowerUser`,
    /// `Technician` and `Admin`.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded document is malformed.
    pub fn builtin() -> AuthResult<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parses a catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the document is malformed.
    pub fn from_json(json: &str) -> AuthResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| AuthError::configuration(format!("invalid role catalog: {e}")))
    }

    /// Reads and parses a catalog file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> AuthResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AuthError::configuration(format!(
                "failed to read role catalog {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content)
    }

    /// Looks up a role by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Role> {
        self.roles.get(name)
    }

    /// Returns `true` if the catalog defines no roles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
