//! Per-entity permission sets and the gate used before UI actions

use super::permissions::{has_all_permissions, has_permission, Action, Capability};
use crate::notify::{Notifier, Toast};
use crate::session::{GarageProfile, ProfileRef, SessionContext};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// CRUD flags for one entity type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PermissionSet {
    pub view: bool,
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
}

impl PermissionSet {
    pub const ALL: PermissionSet = PermissionSet {
        view: true,
        create: true,
        edit: true,
        delete: true,
    };

    pub const NONE: PermissionSet = PermissionSet {
        view: false,
        create: false,
        edit: false,
        delete: false,
    };

    /// Derive the set for `entity` from a profile
    ///
    /// Holding all four capabilities short-circuits to [`PermissionSet::ALL`].
    pub fn for_entity(profile: Option<&GarageProfile>, entity: &str) -> Self {
        let [view, create, edit, delete] = Capability::crud(entity).map(|c| c.token());

        if has_all_permissions(profile, [&view, &create, &edit, &delete]) {
            return Self::ALL;
        }

        Self {
            view: has_permission(profile, &view),
            create: has_permission(profile, &create),
            edit: has_permission(profile, &edit),
            delete: has_permission(profile, &delete),
        }
    }
}

/// Reactive permission set for one entity
///
/// Recomputes from the session's profile cell every time it changes.
pub struct EntityPermissions {
    entity: String,
    rx: watch::Receiver<ProfileRef>,
}

impl EntityPermissions {
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Permission set for the profile published most recently
    pub fn current(&self) -> PermissionSet {
        PermissionSet::for_entity(self.rx.borrow().as_deref(), &self.entity)
    }

    /// Wait for the next profile change and return the recomputed set
    ///
    /// Returns `None` once the session has been dropped.
    pub async fn changed(&mut self) -> Option<PermissionSet> {
        self.rx.changed().await.ok()?;
        let profile = self.rx.borrow_and_update().clone();
        Some(PermissionSet::for_entity(profile.as_deref(), &self.entity))
    }
}

/// Composes permission checks with user-facing feedback
#[derive(Clone)]
pub struct PermissionHelper {
    session: SessionContext,
    notifier: Arc<dyn Notifier>,
}

impl PermissionHelper {
    pub fn new(session: SessionContext, notifier: Arc<dyn Notifier>) -> Self {
        Self { session, notifier }
    }

    /// Permission set for `entity` right now
    pub fn entity_permissions(&self, entity: &str) -> PermissionSet {
        PermissionSet::for_entity(self.session.profile().as_deref(), entity)
    }

    /// Permission set for `entity` that follows profile updates
    pub fn watch_entity(&self, entity: &str) -> EntityPermissions {
        EntityPermissions {
            entity: entity.to_string(),
            rx: self.session.subscribe(),
        }
    }

    /// Gate a UI action
    ///
    /// When `granted` is false an "upgrade required" toast naming the action
    /// is published and false is returned. Every denied call notifies.
    pub fn check_permission(&self, granted: bool, action: &str) -> bool {
        if !granted {
            debug!(action, "Action blocked by plan");
            self.notifier.notify(Toast::upgrade_required(action));
            return false;
        }
        true
    }

    /// Gate every action in `actions` on `entity`, notifying once per missing one
    pub fn check_actions(&self, entity: &str, actions: &[Action]) -> bool {
        let profile = self.session.profile();
        actions.iter().fold(true, |allowed, action| {
            let capability = Capability::new(entity, *action);
            let granted = has_permission(profile.as_deref(), &capability.token());
            self.check_permission(granted, &format!("{} {}", action, entity)) && allowed
        })
    }
}
