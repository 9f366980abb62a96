use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use printgate_auth::config::AuthConfig;
use printgate_queue::QueueConfig;
use serde::{Deserialize, Serialize};

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "printgate.toml";

/// Prefix of environment overrides, e.g. `PRINTGATE__SERVER__PORT=9090`.
pub const ENV_PREFIX: &str = "PRINTGATE";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Sessions, role catalog and provisioned users
    #[serde(default)]
    pub auth: AuthConfig,
    /// Promotion behaviour, initial service state and settings
    #[serde(default)]
    pub queue: QueueConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.host.parse::<IpAddr>().is_err() {
            return Err(format!(
                "server.host must be an IP address, got '{}'",
                self.server.host
            ));
        }
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        self.auth
            .validate()
            .map_err(|e| format!("auth config error: {e}"))?;
        Ok(())
    }

    /// Listen address. Assumes a validated config; an unparsable host binds
    /// to loopback only.
    pub fn addr(&self) -> SocketAddr {
        let host = self.server.host.parse().unwrap_or_else(|_| {
            tracing::warn!(host = %self.server.host, "Unparsable server.host; binding to loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        });
        SocketAddr::new(host, self.server.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_body_limit() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::{AppConfig, DEFAULT_CONFIG_FILE, ENV_PREFIX};
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Loads the file (if it exists), applies environment overrides and
    /// validates the result.
    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        } else if path.is_some() {
            tracing::warn!(path = %pathbuf.display(), "Config file not found; using defaults");
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.addr().port(), 8080);
    }

    #[test]
    fn test_rejects_port_zero_and_bad_level() {
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.validate().unwrap_err().contains("server.port"));

        let mut cfg = AppConfig::default();
        cfg.logging.level = "loud".into();
        assert!(cfg.validate().unwrap_err().contains("logging.level"));
    }

    #[test]
    fn test_auth_errors_are_prefixed() {
        let mut cfg = AppConfig::default();
        cfg.auth.session.ttl = std::time::Duration::ZERO;
        assert!(cfg.validate().unwrap_err().starts_with("auth config error"));
    }

    #[test]
    fn test_rejects_hostname_instead_of_ip() {
        let mut cfg = AppConfig::default();
        cfg.server.host = "localhost".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("server.host"), "{err}");
        assert!(err.contains("localhost"));
        assert!(!cfg.addr().ip().is_unspecified());
    }

    #[test]
    fn test_accepts_ipv6_host() {
        let mut cfg = AppConfig::default();
        cfg.server.host = "::1".into();
        assert!(cfg.validate().is_ok());
        assert!(cfg.addr().ip().is_loopback());
    }
}
