//! Authorization over the cached subscription plan
//!
//! Capability tokens look like `<entity>:<action>`, e.g. `vehicles:edit`.
//! A plan grants a flat set of them; nothing else is consulted.
//!
//! Actions:
//! - `view`, `create`, `edit`, `delete`
//! - `all`: shorthand for all four when parsing

mod helper;
mod permissions;

pub use helper::{EntityPermissions, PermissionHelper, PermissionSet};
pub use permissions::{
    has_all_permissions, has_any_permission, has_permission, Action, Capability,
    PermissionEvaluator,
};
