//! Trailing window of visited pages (for "back" links)

use parking_lot::RwLock;
use std::collections::VecDeque;
use tokio::sync::mpsc;
use tracing::trace;

/// Number of pages remembered
pub const HISTORY_CAPACITY: usize = 10;

/// Fallback when history has nothing useful
pub const HOME_URL: &str = "/";

/// Paths never recorded
const IGNORED_SEGMENTS: [&str; 2] = ["/login", "/register"];

/// Pages under this prefix are skipped by [`NavigationHistory::last_non_system_url`]
const SYSTEM_SEGMENT: &str = "/system";

/// Emitted once a navigation has finished and the final URL is known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEnd {
    /// URL after redirects
    pub url: String,
}

impl NavigationEnd {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Bounded history of visited URLs, oldest first
pub struct NavigationHistory {
    capacity: usize,
    entries: RwLock<VecDeque<String>>,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Record a completed navigation. Returns false if the URL was ignored.
    pub fn record(&self, url: &str) -> bool {
        if IGNORED_SEGMENTS.iter().any(|s| url.contains(s)) {
            trace!(url, "Skipping auth page in history");
            return false;
        }

        let mut entries = self.entries.write();

        // Remove oldest if at capacity
        while entries.len() >= self.capacity {
            entries.pop_front();
        }

        entries.push_back(url.to_string());
        true
    }

    /// The page before the current one, or `/`
    pub fn previous_url(&self) -> String {
        let entries = self.entries.read();
        if entries.len() < 2 {
            return HOME_URL.to_string();
        }
        entries[entries.len() - 2].clone()
    }

    /// Most recent page outside `/system`, or `/`
    pub fn last_non_system_url(&self) -> String {
        self.entries
            .read()
            .iter()
            .rev()
            .find(|url| !url.contains(SYSTEM_SEGMENT))
            .cloned()
            .unwrap_or_else(|| HOME_URL.to_string())
    }

    /// Consume navigation events until the sender side closes
    pub async fn track(&self, mut events: mpsc::Receiver<NavigationEnd>) {
        while let Some(event) = events.recv().await {
            self.record(&event.url);
        }
    }

    /// Snapshot of retained URLs, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.entries.read().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for NavigationHistory {
    fn default() -> Self {
        Self::new()
    }
}
