//! Garagedesk - session, authorization and navigation core for the garage
//! management front end
//!
//! The backend is the only authority on who the user is; this crate keeps a
//! token, asks the backend to validate it before guarded navigations, caches
//! the returned garage profile and answers permission questions from it.

pub mod auth;
pub mod export;
pub mod notify;
pub mod router;
pub mod session;

pub use auth::{Action, Capability, PermissionEvaluator, PermissionHelper, PermissionSet};
pub use export::{CsvExporter, ExportOutcome};
pub use notify::{Notifier, Toast, ToastDisplay, ToastKind};
pub use router::{GuardDecision, NavigationHistory, Route, RouteGuard};
pub use session::{GarageProfile, SessionContext};
