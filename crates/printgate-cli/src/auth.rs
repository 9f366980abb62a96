use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A session token obtained from `printgate login`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredSession {
    pub server: String,
    pub username: String,
    pub token: String,
    pub expires_at: String,
}

impl StoredSession {
    /// First and last characters of the token, for display.
    pub fn token_preview(&self) -> String {
        let token = &self.token;
        if token.len() > 20 {
            format!("{}...{}", &token[..8], &token[token.len() - 8..])
        } else {
            token.clone()
        }
    }
}

pub(crate) fn state_dir() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .context("Cannot determine home directory")?
        .join(".printgate");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn session_path(profile: &str) -> Result<PathBuf> {
    Ok(state_dir()?.join(format!("session.{profile}.json")))
}

pub fn load_session(profile: &str) -> Result<Option<StoredSession>> {
    let path = session_path(profile)?;
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let session: StoredSession = serde_json::from_str(&content)
        .with_context(|| format!("Corrupt session file {}", path.display()))?;
    Ok(Some(session))
}

pub fn save_session(profile: &str, session: &StoredSession) -> Result<()> {
    let path = session_path(profile)?;
    let content = serde_json::to_string_pretty(session)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn remove_session(profile: &str) -> Result<bool> {
    let path = session_path(profile)?;
    if path.exists() {
        fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_preview() {
        let session = StoredSession {
            server: "http://localhost:8080".into(),
            username: "alice".into(),
            token: "abcdefghijklmnopqrstuvwxyz0123456789ABCDEFG".into(),
            expires_at: "2026-01-01T00:00:00Z".into(),
        };
        assert_eq!(session.token_preview(), "abcdefgh...9ABCDEFG");
    }
}
