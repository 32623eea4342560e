//! Connection settings for the admin backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backend used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/admin/";

/// Request timeout used when nothing is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent string for API requests.
pub const DEFAULT_USER_AGENT: &str = concat!("admin-console/", env!("CARGO_PKG_VERSION"));

/// How to reach the admin backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL the console's relative paths are resolved against. Should end
    /// with `/` so that `./admin.json` lands inside it.
    pub base_url: String,

    /// Per-request timeout.
    #[serde(with = "secs")]
    pub timeout: Duration,

    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Settings for `base_url` with default timeout and user agent.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("admin-console/"));
    }

    #[test]
    fn test_timeout_serializes_as_seconds() {
        let config = ClientConfig::new("http://example.com/admin/").with_timeout(Duration::from_secs(5));
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["timeout"], 5);
        let back: ClientConfig = serde_json::from_value(value).unwrap();
        assert_eq!(back, config);
    }
}
