//! Client configuration, optionally read from the environment.

use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default OneSignal API root.
pub const DEFAULT_BASE_URL: &str = "https://onesignal.com/api/v1/";

pub const ENV_BASE_URL: &str = "ONESIGNAL_BASE_URL";
pub const ENV_APP_KEY: &str = "ONESIGNAL_APP_KEY";
pub const ENV_USER_KEY: &str = "ONESIGNAL_USER_KEY";
pub const ENV_TIMEOUT_SECS: &str = "ONESIGNAL_TIMEOUT_SECS";

/// Settings used by `Client::from_config`.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// REST API key of a single app, used by player and notification calls.
    pub app_key: String,
    /// Account-wide key, used by the `/apps` endpoints.
    pub user_key: String,
    /// Overall per-request timeout. `None` leaves the transport default.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            app_key: String::new(),
            user_key: String::new(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Read `ONESIGNAL_*` variables, falling back to defaults for unset ones.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(app_key) = lookup(ENV_APP_KEY) {
            config.app_key = app_key;
        }
        if let Some(user_key) = lookup(ENV_USER_KEY) {
            config.user_key = user_key;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got {raw:?}")))?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("app_key", &redact(&self.app_key))
            .field("user_key", &redact(&self.user_key))
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub(crate) fn redact(key: &str) -> &'static str {
    if key.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_point_at_onesignal() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, "https://onesignal.com/api/v1/");
        assert!(config.timeout.is_none());
    }

    #[test]
    fn reads_every_variable() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "http://127.0.0.1:3000"),
            (ENV_APP_KEY, "app"),
            (ENV_USER_KEY, "user"),
            (ENV_TIMEOUT_SECS, "15"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.app_key, "app");
        assert_eq!(config.user_key, "user");
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn rejects_bad_timeout() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn debug_output_hides_keys() {
        let config = ClientConfig {
            app_key: "secret-app-key".to_string(),
            ..ClientConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-app-key"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("<unset>"));
    }
}
