//! Navigation: guarding, history and the route table
//!
//! - Guard: validates the session token before guarded routes are entered
//! - History: trailing window of visited pages for back links
//! - Routes: which paths exist and which need the guard

mod guard;
mod history;
mod navigation;
mod remote;
mod routes;

pub use guard::{
    DenyReason, GuardDecision, RouteGuard, TokenValidator, ValidationError, PRESERVED_PARAMS,
    TOKEN_PARAM,
};
pub use history::{NavigationEnd, NavigationHistory, HISTORY_CAPACITY, HOME_URL};
pub use navigation::{NavigationError, NavigationLog, NavigationRequest, Navigator, NavigatorEvent};
pub use routes::{Route, APPROVE_PATH, LOGIN_PATH, REGISTER_PATH};
