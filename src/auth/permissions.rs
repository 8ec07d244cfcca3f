//! Capability tokens and permission evaluation

use crate::session::{GarageProfile, SessionContext};
use std::fmt;

/// Actions a plan can grant on an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::View, Action::Create, Action::Edit, Action::Delete];

    /// Parse from string, including "all" which expands to every action
    pub fn parse_all(s: &str) -> Option<Vec<Action>> {
        match s.to_lowercase().as_str() {
            "view" => Some(vec![Action::View]),
            "create" => Some(vec![Action::Create]),
            "edit" => Some(vec![Action::Edit]),
            "delete" => Some(vec![Action::Delete]),
            "all" => Some(Action::ALL.to_vec()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single grantable permission: `<entity>:<action>`
///
/// The entity is whatever the caller passes; unknown entities simply never
/// match anything in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Capability {
    pub entity: String,
    pub action: Action,
}

impl Capability {
    pub fn new(entity: impl Into<String>, action: Action) -> Self {
        Self {
            entity: entity.into(),
            action,
        }
    }

    /// The four CRUD capabilities of an entity, in view/create/edit/delete order
    pub fn crud(entity: &str) -> [Capability; 4] {
        Action::ALL.map(|action| Capability::new(entity, action))
    }

    /// Token as it appears in a plan's permission list
    pub fn token(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity, self.action)
    }
}

/// True iff a profile is present and grants `token`
pub fn has_permission(profile: Option<&GarageProfile>, token: &str) -> bool {
    profile.is_some_and(|p| p.permissions().contains(token))
}

/// True iff a profile is present and grants at least one of `tokens`
pub fn has_any_permission<I, S>(profile: Option<&GarageProfile>, tokens: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match profile {
        Some(p) => tokens
            .into_iter()
            .any(|t| p.permissions().contains(t.as_ref())),
        None => false,
    }
}

/// True iff a profile is present and grants every one of `tokens`
pub fn has_all_permissions<I, S>(profile: Option<&GarageProfile>, tokens: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match profile {
        Some(p) => tokens
            .into_iter()
            .all(|t| p.permissions().contains(t.as_ref())),
        None => false,
    }
}

/// Permission checks against whatever profile the session currently holds
#[derive(Debug, Clone)]
pub struct PermissionEvaluator {
    session: SessionContext,
}

impl PermissionEvaluator {
    pub fn new(session: SessionContext) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn has_permission(&self, token: &str) -> bool {
        has_permission(self.session.profile().as_deref(), token)
    }

    pub fn has_any_permission<I, S>(&self, tokens: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        has_any_permission(self.session.profile().as_deref(), tokens)
    }

    pub fn has_all_permissions<I, S>(&self, tokens: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        has_all_permissions(self.session.profile().as_deref(), tokens)
    }

    pub fn can(&self, capability: &Capability) -> bool {
        self.has_permission(&capability.token())
    }
}
