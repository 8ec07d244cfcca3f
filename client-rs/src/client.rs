//! Garage API client implementation

use crate::config::ApiConfig;
use crate::error::{ClientError, Result};
use crate::messages::{GarageProfile, ValidateTokenResponse};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::sync::Arc;
use tracing::{debug, warn};

/// Internal client state
struct ClientInner {
    config: ApiConfig,
    http: reqwest::Client,
}

/// HTTP client for the garage backend
///
/// This struct is cheaply cloneable as it uses an internal Arc.
#[derive(Clone)]
pub struct GarageApiClient {
    inner: Arc<ClientInner>,
}

impl GarageApiClient {
    /// Create a new client with the given configuration
    pub fn new(config: ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone());

        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        reqwest::Url::parse(&config.validate_url())
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.validate_url(), e)))?;

        Ok(Self {
            inner: Arc::new(ClientInner { config, http }),
        })
    }

    /// Get the configuration this client was built with
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Validate a bearer token and return the garage profile attached to it
    ///
    /// Any non-2xx status becomes [`ClientError::Rejected`]. A response that
    /// cannot be decoded into `{ "garage": ... }` is a serialization error.
    pub async fn validate_token(&self, token: &str) -> Result<GarageProfile> {
        let url = self.inner.config.validate_url();
        debug!(%url, "Validating token");

        let response = self
            .inner
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Token validation rejected");
            return Err(ClientError::Rejected {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let parsed: ValidateTokenResponse = serde_json::from_slice(&body)?;

        debug!(
            permissions = parsed.garage.permissions().len(),
            "Token validated"
        );
        Ok(parsed.garage)
    }
}
