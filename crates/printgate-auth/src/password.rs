//! Password hashing and verification.
//!
//! Passwords are stored as Argon2id hashes in PHC string format. The salt and
//! parameters travel inside the PHC string.
//!
//! # Security
//!
//! - Hashing uses Argon2id (hybrid mode) with default parameters
//! - A fresh salt is generated with `OsRng` for every stored password
//! - Verification compares digests in constant time
//!
//! # Example
//!
//! ```
//! use printgate_auth::password::{hash_password, verify_password};
//!
//! let hash = hash_password("password123").unwrap();
//! assert!(hash.starts_with("$argon2id$"));
//!
//! assert!(verify_password("password123", &hash).unwrap());
//! assert!(!verify_password("wrong", &hash).unwrap());
//! ```

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::AuthResult;
use crate::error::AuthError;

/// Hash a password for storage.
///
/// # Errors
///
/// Returns `Internal` if hashing fails.
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch.
///
/// # Errors
///
/// Returns `Internal` only if the stored hash is not a valid PHC string.
pub fn verify_password(password: &str, hash: &str) -> AuthResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AuthError::internal(format!("stored password hash is malformed: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
