//! Authentication gate run before guarded navigations
//!
//! Every attempt re-validates the token remotely. There is no retry and no
//! caching of a previous verdict; any failure clears the persisted token and
//! sends the user to the login page.

use super::navigation::{NavigationError, NavigationRequest, Navigator};
use super::routes::LOGIN_PATH;
use crate::session::{GarageProfile, SessionContext};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Query parameter carrying a token handed over by another page or email link
pub const TOKEN_PARAM: &str = "token";

/// Parameters kept when a token is stripped from the URL, if all are present
pub const PRESERVED_PARAMS: [&str; 2] = ["activated", "email"];

/// Why a remote validation did not produce a profile
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("token rejected with status {0}")]
    Rejected(u16),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed validation response: {0}")]
    Malformed(String),
}

/// Remote collaborator that turns a token into a garage profile
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<GarageProfile, ValidationError>;
}

/// Why a navigation was refused
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DenyReason {
    #[error("no token")]
    Unauthenticated,

    #[error("invalid or expired token (status {status})")]
    InvalidToken { status: u16 },

    #[error("validation request failed: {0}")]
    Transport(String),

    #[error("validation response unusable: {0}")]
    MalformedProfile(String),
}

impl From<ValidationError> for DenyReason {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Rejected(status) => DenyReason::InvalidToken { status },
            ValidationError::Transport(msg) => DenyReason::Transport(msg),
            ValidationError::Malformed(msg) => DenyReason::MalformedProfile(msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Refused; the redirect to the login page has already been issued
    Deny(DenyReason),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

/// Route guard for the authenticated part of the application
#[derive(Clone)]
pub struct RouteGuard {
    session: SessionContext,
    validator: Arc<dyn TokenValidator>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
}

impl RouteGuard {
    pub fn new(
        session: SessionContext,
        validator: Arc<dyn TokenValidator>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            session,
            validator,
            navigator,
            login_path: LOGIN_PATH.to_string(),
        }
    }

    /// Redirect target for refused navigations
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Parse `url` and decide whether the navigation may proceed
    pub async fn check_url(&self, url: &str) -> Result<GuardDecision, NavigationError> {
        let request = NavigationRequest::parse(url)?;
        Ok(self.can_activate(&request).await)
    }

    /// Decide whether `request` may proceed
    pub async fn can_activate(&self, request: &NavigationRequest) -> GuardDecision {
        let Some(token) = self.capture_token(request) else {
            return self.deny(DenyReason::Unauthenticated);
        };

        match self.validator.validate(&token).await {
            Ok(profile) => {
                info!(
                    path = request.path(),
                    permissions = profile.permissions().len(),
                    "Navigation allowed"
                );
                self.session.publish(Some(profile));
                GuardDecision::Allow
            }
            Err(e) => self.deny(e.into()),
        }
    }

    /// Drop the session and go to the login page
    pub fn logout(&self) {
        self.session.logout();
        self.navigator.navigate(&self.login_path);
    }

    /// Token for this attempt; a query token wins over the persisted one
    fn capture_token(&self, request: &NavigationRequest) -> Option<String> {
        let Some(query_token) = request.param(TOKEN_PARAM) else {
            return self.session.token();
        };

        debug!(path = request.path(), "Token found in query parameters");
        if let Err(e) = self.session.set_token(query_token) {
            warn!(error = %e, "Failed to persist token from url");
        }

        let keep_params = PRESERVED_PARAMS.iter().all(|p| request.param(p).is_some());
        let rewritten = if keep_params {
            request.with_only_params(&PRESERVED_PARAMS)
        } else {
            request.bare()
        };
        self.navigator.replace_url(&rewritten.to_url());

        Some(query_token.to_string())
    }

    fn deny(&self, reason: DenyReason) -> GuardDecision {
        warn!(%reason, "Navigation denied");
        self.session.clear_token();
        self.session.publish(None);
        self.navigator.navigate(&self.login_path);
        GuardDecision::Deny(reason)
    }
}
