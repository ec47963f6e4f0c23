// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Connection configuration.
//!
//! [`ConnectionConfig`] is built once at startup, from the environment
//! ([`ConnectionConfig::from_env`]) or programmatically, and never changes
//! afterwards. Its `mode` is only the *initial* deployment mode: the live mode
//! is held by [`ModeState`](crate::mode::ModeState), which is the one place the
//! hybrid-to-relay transition happens.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::HaystackError;

/// How the client reaches the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum DeploymentMode {
    /// Direct connection to the controller.
    Local = 0,
    /// Every call goes through the relay gateway.
    Relay = 1,
    /// Direct until the first connection failure, relay from then on.
    Hybrid = 2,
}

impl DeploymentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DeploymentMode::Local => "local",
            DeploymentMode::Relay => "relay",
            DeploymentMode::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentMode {
    type Err = HaystackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(DeploymentMode::Local),
            "relay" => Ok(DeploymentMode::Relay),
            "hybrid" => Ok(DeploymentMode::Hybrid),
            other => Err(HaystackError::InvalidConfig(format!(
                "unknown deployment mode `{other}` (expected local, relay or hybrid)"
            ))),
        }
    }
}

/// Connection parameters for the controller and the relay gateway.
#[derive(Clone)]
pub struct ConnectionConfig {
    /// Initial deployment mode.
    pub mode: DeploymentMode,
    /// Relay gateway base URL, e.g. `https://relay.example.com`.
    pub relay_url: Option<String>,
    /// Bearer token presented to the relay gateway.
    pub relay_token: Option<String>,
    /// Controller host name or address.
    pub host: String,
    pub port: u16,
    /// Basic-auth user; empty disables basic auth.
    pub username: String,
    pub password: String,
    /// Path of the Haystack API on the controller, e.g. `/haystack`.
    pub api_path: String,
    /// Use `https` for direct connections.
    pub use_tls: bool,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Verify TLS certificates. Controllers often ship self-signed ones.
    pub verify_tls: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            mode: DeploymentMode::Local,
            relay_url: None,
            relay_token: None,
            host: "localhost".to_string(),
            port: 8080,
            username: String::new(),
            password: String::new(),
            api_path: "/haystack".to_string(),
            use_tls: false,
            timeout: Duration::from_secs(30),
            verify_tls: true,
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("mode", &self.mode)
            .field("relay_url", &self.relay_url)
            .field("relay_token", &self.relay_token.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("api_path", &self.api_path)
            .field("use_tls", &self.use_tls)
            .field("timeout", &self.timeout)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

impl ConnectionConfig {
    /// Direct connection to `host:port` with every other setting defaulted.
    pub fn local(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Relay-only connection through `relay_url`.
    pub fn relay(relay_url: impl Into<String>) -> Self {
        Self {
            mode: DeploymentMode::Relay,
            relay_url: Some(relay_url.into()),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: DeploymentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the relay gateway URL and optional bearer token.
    pub fn with_relay(mut self, relay_url: impl Into<String>, token: Option<String>) -> Self {
        self.relay_url = Some(relay_url.into());
        self.relay_token = token;
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_api_path(mut self, api_path: impl Into<String>) -> Self {
        self.api_path = api_path.into();
        self
    }

    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    /// Load from the process environment.
    ///
    /// | Variable           | Meaning                          | Default     |
    /// |--------------------|----------------------------------|-------------|
    /// | `DEPLOYMENT_MODE`  | `local`, `relay` or `hybrid`     | `local`     |
    /// | `RELAY_URL`        | relay gateway base URL           | none        |
    /// | `RELAY_TOKEN`      | relay bearer token               | none        |
    /// | `NIAGARA_HOST`     | controller host                  | `localhost` |
    /// | `NIAGARA_PORT`     | controller port                  | `8080`      |
    /// | `NIAGARA_USERNAME` | basic-auth user                  | empty       |
    /// | `NIAGARA_PASSWORD` | basic-auth password              | empty       |
    /// | `HAYSTACK_PATH`    | API path on the controller       | `/haystack` |
    /// | `USE_HTTPS`        | `true` for https                 | `false`     |
    /// | `REQUEST_TIMEOUT`  | timeout in seconds               | `30`        |
    /// | `VERIFY_SSL`       | `false` to skip cert checks      | `true`      |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup. Malformed values fall back to
    /// the default with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mode = match non_empty("DEPLOYMENT_MODE") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "Unknown DEPLOYMENT_MODE, falling back to local");
                DeploymentMode::Local
            }),
            None => defaults.mode,
        };

        let timeout_secs = parse_or(&non_empty, "REQUEST_TIMEOUT", defaults.timeout.as_secs());

        Self {
            mode,
            relay_url: non_empty("RELAY_URL"),
            relay_token: non_empty("RELAY_TOKEN"),
            host: non_empty("NIAGARA_HOST").unwrap_or(defaults.host),
            port: parse_or(&non_empty, "NIAGARA_PORT", defaults.port),
            username: lookup("NIAGARA_USERNAME").unwrap_or_default(),
            password: lookup("NIAGARA_PASSWORD").unwrap_or_default(),
            api_path: lookup("HAYSTACK_PATH").unwrap_or(defaults.api_path),
            use_tls: non_empty("USE_HTTPS").is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
            timeout: Duration::from_secs(timeout_secs),
            verify_tls: non_empty("VERIFY_SSL").map_or(defaults.verify_tls, |v| {
                v.trim().eq_ignore_ascii_case("true")
            }),
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Copy + fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(
                variable = key,
                value = %raw,
                default = %default,
                "Unparsable value, using default"
            );
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = ConnectionConfig::from_lookup(lookup(&[]));
        assert_eq!(config.mode, DeploymentMode::Local);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_path, "/haystack");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.verify_tls);
        assert!(!config.use_tls);
        assert!(config.relay_url.is_none());
    }

    #[test]
    fn test_full_environment() {
        let config = ConnectionConfig::from_lookup(lookup(&[
            ("DEPLOYMENT_MODE", "HYBRID"),
            ("RELAY_URL", "https://relay.example.com"),
            ("RELAY_TOKEN", "tok"),
            ("NIAGARA_HOST", "10.0.0.5"),
            ("NIAGARA_PORT", "443"),
            ("NIAGARA_USERNAME", "admin"),
            ("NIAGARA_PASSWORD", "pw"),
            ("HAYSTACK_PATH", "/api/haystack"),
            ("USE_HTTPS", "True"),
            ("REQUEST_TIMEOUT", "5"),
            ("VERIFY_SSL", "false"),
        ]));
        assert_eq!(config.mode, DeploymentMode::Hybrid);
        assert_eq!(config.relay_url.as_deref(), Some("https://relay.example.com"));
        assert_eq!(config.relay_token.as_deref(), Some("tok"));
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.port, 443);
        assert_eq!(config.username, "admin");
        assert_eq!(config.api_path, "/api/haystack");
        assert!(config.use_tls);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(!config.verify_tls);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = ConnectionConfig::from_lookup(lookup(&[
            ("DEPLOYMENT_MODE", "cloud"),
            ("NIAGARA_PORT", "eighty"),
            ("REQUEST_TIMEOUT", "-1"),
        ]));
        assert_eq!(config.mode, DeploymentMode::Local);
        assert_eq!(config.port, 8080);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("relay".parse::<DeploymentMode>().unwrap(), DeploymentMode::Relay);
        assert_eq!(" Local ".parse::<DeploymentMode>().unwrap(), DeploymentMode::Local);
        assert!("remote".parse::<DeploymentMode>().is_err());
        assert_eq!(DeploymentMode::Hybrid.to_string(), "hybrid");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ConnectionConfig::local("h", 1)
            .with_credentials("admin", "hunter2")
            .with_relay("http://r", Some("tok-123".into()));
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("tok-123"));
        assert!(rendered.contains("admin"));
    }
}
