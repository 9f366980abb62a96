//! Permission resolution over the role-inheritance graph.
//!
//! Every role is resolved once, when the engine is built. Lookups afterwards
//! only read an immutable map.
//!
//! Resolution is a depth-first walk with an explicit per-role mark. A role
//! that is reached again while it is still `InProgress` is part of a cycle and
//! contributes nothing further to that walk. Once the walk is done, a
//! fixpoint pass propagates permissions around any detected cycle so that
//! every role ends up with the union of everything it can reach.

use std::collections::{BTreeSet, HashMap};

use crate::AuthResult;
use crate::error::AuthError;
use crate::operation::Operation;

use super::catalog::RoleCatalog;

/// Resolution state of a single role during the walk.
enum Mark {
    InProgress,
    Done(BTreeSet<String>),
}

/// Resolved permissions for every role in a catalog.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    resolved: HashMap<String, BTreeSet<String>>,
}

impl PolicyEngine {
    /// Resolves every role of the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RoleNotFound` if a role inherits from a role that the catalog
    /// does not define.
    pub fn from_catalog(catalog: &RoleCatalog) -> AuthResult<Self> {
        for (name, role) in &catalog.roles {
            for parent in &role.inherits {
                if catalog.get(parent).is_none() {
                    tracing::error!(role = %name, parent = %parent, "Role inherits from undefined role");
                    return Err(AuthError::role_not_found(parent.clone()));
                }
            }
            for permission in &role.permissions {
                if permission.parse::<Operation>().is_err() {
                    tracing::warn!(
                        role = %name,
                        permission = %permission,
                        "Role grants a permission that no operation checks"
                    );
                }
            }
        }

        let mut marks: HashMap<&str, Mark> = HashMap::with_capacity(catalog.roles.len());
        let mut cycle_detected = false;
        for name in catalog.roles.keys() {
            resolve(name, catalog, &mut marks, &mut cycle_detected)?;
        }

        let mut resolved: HashMap<String, BTreeSet<String>> = marks
            .into_iter()
            .filter_map(|(name, mark)| match mark {
                Mark::Done(set) => Some((name.to_string(), set)),
                Mark::InProgress => None,
            })
            .collect();

        if cycle_detected {
            tracing::warn!("Role catalog contains inheritance cycles; merging cyclic roles");
            close_over_cycles(catalog, &mut resolved);
        }

        for (role, permissions) in &resolved {
            tracing::debug!(role = %role, permissions = ?permissions, "Resolved role permissions");
        }

        Ok(Self { resolved })
    }

    /// Returns the resolved permission set of a role.
    ///
    /// # Errors
    ///
    /// Returns `RoleNotFound` for an unknown role.
    pub fn permissions_for(&self, role: &str) -> AuthResult<&BTreeSet<String>> {
        self.resolved
            .get(role)
            .ok_or_else(|| AuthError::role_not_found(role))
    }

    /// Returns `true` if the role grants the operation.
    ///
    /// # Errors
    ///
    /// Returns `RoleNotFound` for an unknown role.
    pub fn is_permitted(&self, role: &str, operation: Operation) -> AuthResult<bool> {
        Ok(self.permissions_for(role)?.contains(operation.as_str()))
    }

    /// Returns `true` if the role is defined.
    #[must_use]
    pub fn contains_role(&self, role: &str) -> bool {
        self.resolved.contains_key(role)
    }

    /// Names of all resolved roles, sorted.
    #[must_use]
    pub fn roles(&self) -> Vec<&str> {
        let mut roles: Vec<&str> = self.resolved.keys().map(String::as_str).collect();
        roles.sort_unstable();
        roles
    }
}

fn resolve<'a>(
    name: &'a str,
    catalog: &'a RoleCatalog,
    marks: &mut HashMap<&'a str, Mark>,
    cycle_detected: &mut bool,
) -> AuthResult<BTreeSet<String>> {
    match marks.get(name) {
        Some(Mark::Done(set)) => return Ok(set.clone()),
        Some(Mark::InProgress) => {
            *cycle_detected = true;
            return Ok(BTreeSet::new());
        }
        None => {}
    }

    let (key, role) = catalog
        .roles
        .get_key_value(name)
        .ok_or_else(|| AuthError::role_not_found(name))?;

    marks.insert(key.as_str(), Mark::InProgress);

    let mut permissions = role.permissions.clone();
    for parent in &role.inherits {
        permissions.extend(resolve(parent, catalog, marks, cycle_detected)?);
    }

    marks.insert(key.as_str(), Mark::Done(permissions.clone()));
    Ok(permissions)
}

/// Grows every set with its parents' sets until nothing changes.
///
/// Sets only ever grow and are bounded by the catalog's permissions, so this
/// terminates.
fn close_over_cycles(catalog: &RoleCatalog, resolved: &mut HashMap<String, BTreeSet<String>>) {
    loop {
        let mut changed = false;
        for (name, role) in &catalog.roles {
            let inherited: Vec<String> = role
                .inherits
                .iter()
                .filter_map(|parent| resolved.get(parent))
                .flat_map(|set| set.iter().cloned())
                .collect();
            if let Some(set) = resolved.get_mut(name) {
                for permission in inherited {
                    changed |= set.insert(permission);
                }
            }
        }
        if !changed {
            break;
        }
    }
}
