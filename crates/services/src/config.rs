use std::env;
use std::time::Duration;

/// Connection and timing settings for the assessment client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub request_timeout: Duration,
    pub tick_interval: Duration,
}

impl ClientConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:5000";
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            tick_interval: Self::DEFAULT_TICK_INTERVAL,
        }
    }

    /// Reads `ASSESS_API_URL`, `ASSESS_API_TOKEN`, `ASSESS_TIMEOUT_SECS` and
    /// `ASSESS_TICK_MS`, falling back to defaults for anything missing or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("ASSESS_API_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_BASE_URL.into());
        let api_token = env::var("ASSESS_API_TOKEN")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let request_timeout = env::var("ASSESS_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(Self::DEFAULT_REQUEST_TIMEOUT, Duration::from_secs);
        let tick_interval = env::var("ASSESS_TICK_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map_or(Self::DEFAULT_TICK_INTERVAL, Duration::from_millis);

        Self {
            base_url,
            api_token,
            request_timeout,
            tick_interval,
        }
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_root_strips_trailing_slash() {
        let config = ClientConfig::new("https://school.example/");
        assert_eq!(config.api_root(), "https://school.example");
        assert_eq!(config.tick_interval, Duration::from_secs(1));
    }
}
