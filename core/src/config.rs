//! Per-request option map and sender-wide settings.
//!
//! # Design
//! `Config` is the caller's mutable option bag on a `PendingRequest`. The
//! sender merges into it (it forces `http_errors` off) so a request that has
//! been sent is not the same request it was before. `SenderConfig` is read
//! once to build the shared native client.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Key of the option that tells the native client whether error statuses
/// should be raised as native errors.
pub const HTTP_ERRORS: &str = "http_errors";

/// Ordered, JSON-valued option map attached to a pending request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    entries: Map<String, Value>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Merge `entries` in, overwriting existing keys.
    pub fn merge<K, V, I>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in entries {
            self.entries.insert(key.into(), value.into());
        }
        self
    }

    pub fn all(&self) -> &Map<String, Value> {
        &self.entries
    }

    /// Whether the native client should raise error statuses. Defaults to
    /// `true` when unset or not a boolean.
    pub fn http_errors(&self) -> bool {
        self.get(HTTP_ERRORS).and_then(Value::as_bool).unwrap_or(true)
    }
}

/// Settings for the shared native client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: format!("http-sender/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SenderConfig {
    /// Read overrides from `HTTP_SENDER_TIMEOUT`, `HTTP_SENDER_CONNECT_TIMEOUT`
    /// and `HTTP_SENDER_USER_AGENT`. Unset or unparsable values keep the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            timeout_secs: env_u64("HTTP_SENDER_TIMEOUT").unwrap_or(defaults.timeout_secs),
            connect_timeout_secs: env_u64("HTTP_SENDER_CONNECT_TIMEOUT")
                .unwrap_or(defaults.connect_timeout_secs),
            user_agent: std::env::var("HTTP_SENDER_USER_AGENT")
                .unwrap_or_else(|_| defaults.user_agent),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
