//! Session state shared by every consumer
//!
//! - Token: durable, lives in a [`TokenStore`]
//! - Profile: in memory only, published through a watch cell so readers
//!   always see the latest value and writers replace it whole

mod store;

pub use garagedesk_client::GarageProfile;
pub use store::{FileTokenStore, MemoryTokenStore, StorageError, TokenStore, TOKEN_KEY};

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Shared, immutable view of the current profile
pub type ProfileRef = Option<Arc<GarageProfile>>;

/// Point-in-time copy of the session
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub token: Option<String>,
    pub profile: ProfileRef,
}

struct SessionInner {
    tokens: Arc<dyn TokenStore>,
    profile: watch::Sender<ProfileRef>,
}

/// Injectable session context
///
/// Cheap to clone; every clone sees the same token store and profile cell.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<SessionInner>,
}

impl SessionContext {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        let (profile, _) = watch::channel(None);
        Self {
            inner: Arc::new(SessionInner { tokens, profile }),
        }
    }

    /// Session backed by an in-memory token store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    /// Persisted token. Unreadable storage counts as no token.
    pub fn token(&self) -> Option<String> {
        match self.inner.tokens.get() {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read persisted token");
                None
            }
        }
    }

    pub fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.inner.tokens.set(token)
    }

    pub fn clear_token(&self) {
        if let Err(e) = self.inner.tokens.clear() {
            warn!(error = %e, "Failed to clear persisted token");
        }
    }

    /// Current profile
    pub fn profile(&self) -> ProfileRef {
        self.inner.profile.borrow().clone()
    }

    /// Replace the cached profile and notify subscribers
    ///
    /// This is the only way the profile changes.
    pub fn publish(&self, profile: Option<GarageProfile>) {
        let profile = profile.map(Arc::new);
        self.inner.profile.send_replace(profile);
    }

    /// Receiver that observes every published profile
    pub fn subscribe(&self) -> watch::Receiver<ProfileRef> {
        self.inner.profile.subscribe()
    }

    pub fn snapshot(&self) -> Session {
        Session {
            token: self.token(),
            profile: self.profile(),
        }
    }

    /// Forget the token and the cached profile
    pub fn logout(&self) {
        self.clear_token();
        self.publish(None);
        info!("Session cleared");
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("has_profile", &self.inner.profile.borrow().is_some())
            .finish_non_exhaustive()
    }
}
