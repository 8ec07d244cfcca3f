//! Configuration for the garage API client

use std::time::Duration;

/// Path of the token validation endpoint, relative to the API base URL
pub const DEFAULT_VALIDATE_PATH: &str = "/auth/validate-token";

/// Configuration for talking to the garage backend
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Backend base URL (e.g., "https://api.example.com")
    pub base_url: String,

    /// Path of the validation endpoint
    pub validate_path: String,

    /// Upper bound for a single request. `None` waits for the backend indefinitely.
    pub request_timeout: Option<Duration>,

    /// Value sent in the User-Agent header
    pub user_agent: String,
}

impl ApiConfig {
    /// Create a new configuration for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            validate_path: DEFAULT_VALIDATE_PATH.to_string(),
            request_timeout: None,
            user_agent: concat!("garagedesk/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Read the base URL from `GARAGEDESK_API_URL`
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("GARAGEDESK_API_URL").ok()?;
        let mut config = Self::new(url);

        if let Some(secs) = std::env::var("GARAGEDESK_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        Some(config)
    }

    /// Override the validation endpoint path
    pub fn validate_path(mut self, path: impl Into<String>) -> Self {
        self.validate_path = path.into();
        self
    }

    /// Bound each request by `timeout`
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Full URL of the validation endpoint
    pub fn validate_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.validate_path.trim_start_matches('/')
        )
    }
}
