//! Navigation requests and the side effects the guard issues on them

use parking_lot::Mutex;
use reqwest::Url;
use thiserror::Error;

/// Origin used to resolve app-relative URLs; never shown to anyone
const BASE: &str = "http://garagedesk.local/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("invalid navigation url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// An attempted navigation: a path plus decoded query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    path: String,
    query: Vec<(String, String)>,
}

impl NavigationRequest {
    /// Parse an app-relative URL such as `/approve?token=abc&email=a%40b.c`
    pub fn parse(url: &str) -> Result<Self, NavigationError> {
        let base = Url::parse(BASE).map_err(|e| NavigationError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let parsed = base.join(url).map_err(|e| NavigationError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            path: parsed.path().to_string(),
            query: parsed.query_pairs().into_owned().collect(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of a query parameter, empty values count as absent
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Same path with only the given parameters kept, in the given order
    pub fn with_only_params(&self, names: &[&str]) -> Self {
        let query = names
            .iter()
            .filter_map(|name| self.param(name).map(|v| (name.to_string(), v.to_string())))
            .collect();
        Self {
            path: self.path.clone(),
            query,
        }
    }

    /// Same path without any query string
    pub fn bare(&self) -> Self {
        Self {
            path: self.path.clone(),
            query: Vec::new(),
        }
    }

    /// Render back to an app-relative URL with an encoded query string
    pub fn to_url(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }

        let mut url = match Url::parse(BASE) {
            Ok(url) => url,
            Err(_) => return self.path.clone(),
        };
        url.query_pairs_mut()
            .extend_pairs(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        match url.query() {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }
}

/// Router operations the guard needs
pub trait Navigator: Send + Sync {
    /// Start a new navigation to `path`
    fn navigate(&self, path: &str);

    /// Rewrite the current address without navigating
    fn replace_url(&self, url: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigatorEvent {
    Navigate(String),
    ReplaceUrl(String),
}

/// Navigator that records what it was asked to do
#[derive(Debug, Default)]
pub struct NavigationLog {
    events: Mutex<Vec<NavigatorEvent>>,
}

impl NavigationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NavigatorEvent> {
        self.events.lock().clone()
    }

    /// Target of the last `navigate` call
    pub fn last_redirect(&self) -> Option<String> {
        self.events.lock().iter().rev().find_map(|e| match e {
            NavigatorEvent::Navigate(path) => Some(path.clone()),
            NavigatorEvent::ReplaceUrl(_) => None,
        })
    }

    /// Target of the last `replace_url` call
    pub fn last_replaced_url(&self) -> Option<String> {
        self.events.lock().iter().rev().find_map(|e| match e {
            NavigatorEvent::ReplaceUrl(url) => Some(url.clone()),
            NavigatorEvent::Navigate(_) => None,
        })
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Navigator for NavigationLog {
    fn navigate(&self, path: &str) {
        tracing::info!(path, "Redirecting");
        self.events.lock().push(NavigatorEvent::Navigate(path.to_string()));
    }

    fn replace_url(&self, url: &str) {
        tracing::debug!(url, "Replacing url");
        self.events.lock().push(NavigatorEvent::ReplaceUrl(url.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path_and_params() {
        let req = NavigationRequest::parse("/approve?token=abc&email=a%40b.com&activated=true")
            .unwrap();

        assert_eq!(req.path(), "/approve");
        assert_eq!(req.param("token"), Some("abc"));
        assert_eq!(req.param("email"), Some("a@b.com"));
        assert_eq!(req.param("activated"), Some("true"));
        assert_eq!(req.param("missing"), None);
    }

    #[test]
    fn test_parse_without_query() {
        let req = NavigationRequest::parse("/vehicles/12").unwrap();
        assert_eq!(req.path(), "/vehicles/12");
        assert!(req.query().is_empty());
        assert_eq!(req.to_url(), "/vehicles/12");
    }

    #[test]
    fn test_empty_param_is_absent() {
        let req = NavigationRequest::parse("/?token=").unwrap();
        assert_eq!(req.param("token"), None);
    }

    #[test]
    fn test_with_only_params_round_trips_encoding() {
        let req = NavigationRequest::parse("/?token=t&email=a%40b.com&activated=1&x=y").unwrap();
        let kept = req.with_only_params(&["activated", "email"]);

        assert_eq!(kept.to_url(), "/?activated=1&email=a%40b.com");
        assert_eq!(req.bare().to_url(), "/");
    }

    #[test]
    fn test_navigation_log() {
        let log = NavigationLog::new();
        log.replace_url("/home");
        log.navigate("/login");

        assert_eq!(
            log.events(),
            vec![
                NavigatorEvent::ReplaceUrl("/home".into()),
                NavigatorEvent::Navigate("/login".into()),
            ]
        );
        assert_eq!(log.last_redirect().as_deref(), Some("/login"));
        assert_eq!(log.last_replaced_url().as_deref(), Some("/home"));
    }
}
