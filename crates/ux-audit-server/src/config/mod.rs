//! Configuration loading and resolution.
//!
//! Precedence: CLI flag > environment (including `.env`) > default.

use std::fmt;
use std::time::Duration;

use ux_audit::gemini::{DEFAULT_BASE_URL, REDACTED};
use ux_audit::DEFAULT_FETCH_TIMEOUT;

/// Default listen address.
pub const DEFAULT_ADDR: &str = "127.0.0.1:8000";

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_ADDR: &str = "UX_AUDIT_ADDR";
pub const ENV_GEMINI_BASE_URL: &str = "UX_AUDIT_GEMINI_BASE_URL";
pub const ENV_NARRATIVE_TIMEOUT: &str = "UX_AUDIT_NARRATIVE_TIMEOUT_SECS";
pub const ENV_FETCH_TIMEOUT: &str = "UX_AUDIT_FETCH_TIMEOUT_SECS";

/// Resolved server settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: String,
    /// `None` disables narratives.
    pub api_key: Option<String>,
    pub gemini_base_url: String,
    /// `None` leaves the model call unbounded.
    pub narrative_timeout: Option<Duration>,
    pub fetch_timeout: Duration,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("addr", &self.addr)
            .field("api_key", &self.api_key.as_ref().map(|_| REDACTED))
            .field("gemini_base_url", &self.gemini_base_url)
            .field("narrative_timeout", &self.narrative_timeout)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            api_key: None,
            gemini_base_url: DEFAULT_BASE_URL.to_string(),
            narrative_timeout: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let secs = |key: &str| {
            non_blank(key)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
        };

        Self {
            addr: non_blank(ENV_ADDR).unwrap_or(defaults.addr),
            api_key: non_blank(ENV_API_KEY),
            gemini_base_url: non_blank(ENV_GEMINI_BASE_URL).unwrap_or(defaults.gemini_base_url),
            narrative_timeout: secs(ENV_NARRATIVE_TIMEOUT),
            fetch_timeout: secs(ENV_FETCH_TIMEOUT).unwrap_or(defaults.fetch_timeout),
        }
    }

    /// Apply CLI overrides on top of the loaded values.
    pub fn with_overrides(mut self, addr: Option<String>, api_key: Option<String>) -> Self {
        if let Some(addr) = addr {
            self.addr = addr;
        }
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.addr, "127.0.0.1:8000");
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert!(config.narrative_timeout.is_none());
    }

    #[test]
    fn test_reads_environment() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "secret"),
            ("UX_AUDIT_ADDR", "0.0.0.0:9000"),
            ("UX_AUDIT_NARRATIVE_TIMEOUT_SECS", "30"),
            ("UX_AUDIT_FETCH_TIMEOUT_SECS", "4"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.addr, "0.0.0.0:9000");
        assert_eq!(config.narrative_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.fetch_timeout, Duration::from_secs(4));
    }

    #[test]
    fn test_blank_key_is_absent() {
        let config = ServerConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "   ")]));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_bad_timeout_falls_back() {
        let config = ServerConfig::from_lookup(lookup(&[("UX_AUDIT_FETCH_TIMEOUT_SECS", "soon")]));
        assert_eq!(config.fetch_timeout, DEFAULT_FETCH_TIMEOUT);
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = ServerConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "super-secret")]));
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains(REDACTED));
        assert!(rendered.contains("127.0.0.1:8000"));

        let rendered = format!("{:?}", ServerConfig::default());
        assert!(rendered.contains("api_key: None"));
    }

    #[test]
    fn test_cli_overrides_env() {
        let config = ServerConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "env-key")]))
            .with_overrides(Some("127.0.0.1:1234".into()), Some("cli-key".into()));
        assert_eq!(config.addr, "127.0.0.1:1234");
        assert_eq!(config.api_key.as_deref(), Some("cli-key"));

        let config = ServerConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "env-key")]))
            .with_overrides(None, None);
        assert_eq!(config.api_key.as_deref(), Some("env-key"));
    }
}
