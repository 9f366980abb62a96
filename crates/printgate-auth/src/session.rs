//! Session manager.
//!
//! Sessions are opaque server-side records keyed by a random token.
//!
//! ```text
//! Active --(ttl elapses)--> Expired --(next validate / sweep)--> Removed
//! Active --(revoke)--> Removed
//! ```
//!
//! # Security Considerations
//!
//! - Tokens carry 256 bits of randomness and are never logged in full
//! - Validation fails closed for empty, malformed and unknown tokens
//! - An expired session is evicted by the check that finds it expired, so it
//!   can never validate again

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use dashmap::DashMap;
use serde::Serialize;
use time::OffsetDateTime;
use tokio::task::JoinHandle;

/// Default session lifetime.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Random bytes per token.
const TOKEN_BYTES: usize = 32;

/// Length of a base64url (unpadded) encoded token.
const TOKEN_LENGTH: usize = 43;

// =============================================================================
// Session
// =============================================================================

/// An authenticated session.
#[derive(Clone, Serialize)]
pub struct Session {
    /// Opaque bearer token.
    pub token: String,

    /// The authenticated user.
    pub username: String,

    /// When the session was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the session stops being valid.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl Session {
    /// Returns `true` if the session has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }

    /// Returns a short, loggable token prefix.
    #[must_use]
    pub fn token_hint(&self) -> &str {
        token_hint(&self.token)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &format_args!("{}…", self.token_hint()))
            .field("username", &self.username)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Returns the first eight characters of a token for log correlation.
#[must_use]
pub fn token_hint(token: &str) -> &str {
    token.get(..8).unwrap_or("")
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LENGTH
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

// =============================================================================
// Session Manager
// =============================================================================

/// Issues, validates and revokes sessions.
///
/// The table is a sharded concurrent map: lookups on different tokens do not
/// contend, and no shard lock is held across an await point.
pub struct SessionManager {
    sessions: DashMap<String, Session>,
    ttl: Duration,
}

impl SessionManager {
    /// Creates a manager issuing sessions that live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Creates a session for an authenticated user.
    pub fn create(&self, username: &str) -> Session {
        self.create_at(username, OffsetDateTime::now_utc())
    }

    fn create_at(&self, username: &str, now: OffsetDateTime) -> Session {
        let session = Session {
            token: generate_token(),
            username: username.to_string(),
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.sessions.insert(session.token.clone(), session.clone());
        tracing::debug!(
            username = %username,
            token = %session.token_hint(),
            expires_at = %session.expires_at,
            "Session created"
        );
        session
    }

    /// Returns the session for `token` if it exists and has not expired.
    ///
    /// An expired session is removed as a side effect.
    #[must_use]
    pub fn validate(&self, token: &str) -> Option<Session> {
        self.validate_at(token, OffsetDateTime::now_utc())
    }

    /// Returns `true` if `token` names a live session.
    #[must_use]
    pub fn is_valid(&self, token: &str) -> bool {
        self.validate(token).is_some()
    }

    fn validate_at(&self, token: &str, now: OffsetDateTime) -> Option<Session> {
        if !is_well_formed(token) {
            return None;
        }

        let session = self.sessions.get(token).map(|entry| entry.value().clone())?;
        if session.is_expired_at(now) {
            self.sessions.remove_if(token, |_, s| s.is_expired_at(now));
            tracing::debug!(
                username = %session.username,
                token = %session.token_hint(),
                "Session expired and evicted"
            );
            return None;
        }

        Some(session)
    }

    /// Removes a session. Revoking an absent token is a no-op.
    ///
    /// Returns `true` if a session was removed.
    pub fn revoke(&self, token: &str) -> bool {
        match self.sessions.remove(token) {
            Some((_, session)) => {
                tracing::debug!(
                    username = %session.username,
                    token = %session.token_hint(),
                    "Session revoked"
                );
                true
            }
            None => false,
        }
    }

    /// Removes every expired session. Returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_at(OffsetDateTime::now_utc())
    }

    fn cleanup_expired_at(&self, now: OffsetDateTime) -> usize {
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|entry| entry.value().is_expired_at(now))
            .map(|entry| entry.key().clone())
            .collect();

        expired
            .iter()
            .filter(|token| {
                self.sessions
                    .remove_if(token.as_str(), |_, s| s.is_expired_at(now))
                    .is_some()
            })
            .count()
    }

    /// Number of stored sessions, including expired ones not yet evicted.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Spawns a background task that evicts expired sessions every `interval`.
    ///
    /// The task ends on its own once the manager is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let manager: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(strong) = manager.upgrade() else {
                    break;
                };
                let removed = strong.cleanup_expired();
                if removed > 0 {
                    tracing::info!(removed, "Expired sessions swept");
                }
            }
        })
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_validate() {
        let manager = SessionManager::default();
        let session = manager.create("alice");

        assert_eq!(session.token.len(), TOKEN_LENGTH);
        assert_eq!(session.expires_at - session.created_at, DEFAULT_SESSION_TTL);

        let found = manager.validate(&session.token).unwrap();
        assert_eq!(found.username, "alice");
        assert!(manager.is_valid(&session.token));
    }

    #[test]
    fn test_tokens_are_unique() {
        let manager = SessionManager::default();
        let a = manager.create("alice");
        let b = manager.create("alice");
        assert_ne!(a.token, b.token);
        assert_eq!(manager.active_count(), 2);
    }

    #[test]
    fn test_fails_closed_on_bad_tokens() {
        let manager = SessionManager::default();
        manager.create("alice");

        assert!(manager.validate("").is_none());
        assert!(manager.validate("short").is_none());
        assert!(manager.validate(&"!".repeat(TOKEN_LENGTH)).is_none());
        assert!(manager.validate(&generate_token()).is_none());
    }

    #[test]
    fn test_expired_session_is_evicted_and_stays_dead() {
        let manager = SessionManager::new(Duration::from_secs(60));
        let start = OffsetDateTime::now_utc();
        let session = manager.create_at("bob", start);

        let just_before = start + Duration::from_secs(59);
        assert!(manager.validate_at(&session.token, just_before).is_some());

        let at_expiry = start + Duration::from_secs(60);
        assert!(manager.validate_at(&session.token, at_expiry).is_none());
        assert_eq!(manager.active_count(), 0);

        // A later check, even with an earlier clock, does not resurrect it.
        assert!(manager.validate_at(&session.token, just_before).is_none());
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let manager = SessionManager::default();
        let session = manager.create("cecilia");

        assert!(manager.revoke(&session.token));
        assert!(!manager.revoke(&session.token));
        assert!(!manager.revoke("never-issued"));
        assert!(manager.validate(&session.token).is_none());
    }

    #[test]
    fn test_cleanup_expired() {
        let manager = SessionManager::new(Duration::from_secs(10));
        let start = OffsetDateTime::now_utc();
        let old = manager.create_at("a", start - Duration::from_secs(20));
        manager.create_at("b", start - Duration::from_secs(15));
        let fresh = manager.create_at("c", start);

        assert_eq!(manager.cleanup_expired_at(start), 2);
        assert_eq!(manager.active_count(), 1);
        assert!(manager.validate_at(&old.token, start).is_none());
        assert!(manager.validate_at(&fresh.token, start).is_some());
        assert_eq!(manager.cleanup_expired_at(start), 0);
    }

    #[test]
    fn test_debug_redacts_token() {
        let manager = SessionManager::default();
        let session = manager.create("alice");
        let debug = format!("{session:?}");
        assert!(!debug.contains(&session.token));
        assert!(debug.contains(session.token_hint()));
    }

    #[tokio::test]
    async fn test_sweeper_removes_expired_sessions() {
        let manager = Arc::new(SessionManager::new(Duration::from_millis(10)));
        manager.create("alice");
        let handle = manager.spawn_sweeper(Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(manager.active_count(), 0);

        drop(manager);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper should stop once the manager is dropped")
            .unwrap();
    }

    #[test]
    fn test_concurrent_create_validate_revoke() {
        let manager = Arc::new(SessionManager::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let manager = Arc::clone(&manager);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let session = manager.create(&format!("user{i}"));
                        assert!(manager.is_valid(&session.token));
                        assert!(manager.revoke(&session.token));
                        assert!(!manager.is_valid(&session.token));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(manager.active_count(), 0);
    }
}
