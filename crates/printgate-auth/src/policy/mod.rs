//! Role-based policy.
//!
//! - [`catalog`] - role definitions loaded from JSON
//! - [`engine`] - transitive permission resolution over role inheritance
//!
//! # Example
//!
//! ```
//! use printgate_auth::Operation;
//! use printgate_auth::policy::{PolicyEngine, Role, RoleCatalog};
//!
//! let catalog = RoleCatalog::new()
//!     .with_role("User", Role::new().with_permission("status"))
//!     .with_role("Technician", Role::new().with_permission("restart").inherits_from("User"));
//!
//! let engine = PolicyEngine::from_catalog(&catalog).unwrap();
//! assert!(engine.is_permitted("Technician", Operation::Status).unwrap());
//! assert!(!engine.is_permitted("Technician", Operation::Submit).unwrap());
//! ```

pub mod catalog;
pub mod engine;

pub use catalog::{Role, RoleCatalog};
pub use engine::PolicyEngine;
