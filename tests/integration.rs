//! End-to-end tests for the session, guard and permission flow
//!
//! A fake backend on 127.0.0.1:0 answers token validation so the real HTTP
//! client, file token store and route guard run together.

use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use garagedesk::auth::{PermissionEvaluator, PermissionHelper, PermissionSet};
use garagedesk::notify::{ToastKind, ToastLog};
use garagedesk::router::{
    DenyReason, GuardDecision, NavigationEnd, NavigationHistory, NavigationLog, NavigatorEvent,
    RouteGuard,
};
use garagedesk::session::{FileTokenStore, SessionContext, TokenStore};
use garagedesk_client::{ApiConfig, GarageApiClient};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;

const OWNER_TOKEN: &str = "owner-token";
const STARTER_TOKEN: &str = "starter-token";

fn garage(name: &str, permissions: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "garage": {
            "id": 7,
            "name": name,
            "subscription": {
                "plan": { "name": "plan", "permissions": permissions }
            }
        }
    })
}

async fn validate(headers: HeaderMap) -> impl IntoResponse {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    match auth.strip_prefix("Bearer ") {
        Some(OWNER_TOKEN) => (
            StatusCode::OK,
            Json(garage(
                "Owner Motors",
                &[
                    "vehicles:view",
                    "vehicles:create",
                    "vehicles:edit",
                    "vehicles:delete",
                    "invoices:view",
                ],
            )),
        ),
        Some(STARTER_TOKEN) => (
            StatusCode::OK,
            Json(garage("Starter Garage", &["vehicles:view", "vehicles:edit"])),
        ),
        Some("broken") => (StatusCode::OK, Json(serde_json::json!({ "ok": true }))),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "message": "invalid token" })),
        ),
    }
}

async fn serve() -> SocketAddr {
    let app = Router::new().route("/auth/validate-token", get(validate));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app.into_make_service()).await;
    });
    addr
}

struct Harness {
    guard: RouteGuard,
    session: SessionContext,
    navigator: Arc<NavigationLog>,
}

fn harness(addr: SocketAddr, tokens: Arc<dyn TokenStore>) -> Harness {
    let client = GarageApiClient::new(ApiConfig::new(format!("http://{addr}"))).expect("client");
    let session = SessionContext::new(tokens);
    let navigator = Arc::new(NavigationLog::new());
    let guard = RouteGuard::new(session.clone(), Arc::new(client), navigator.clone());
    Harness {
        guard,
        session,
        navigator,
    }
}

#[tokio::test]
async fn test_login_link_flow_with_file_store() {
    let addr = serve().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let h = harness(addr, Arc::new(FileTokenStore::new(&path)));

    let decision = h
        .guard
        .check_url("/approve?token=owner-token&activated=true&email=a%40b.io")
        .await
        .unwrap();

    assert!(decision.is_allowed());
    assert_eq!(
        h.navigator.events(),
        vec![NavigatorEvent::ReplaceUrl(
            "/approve?activated=true&email=a%40b.io".into()
        )]
    );

    // Token survives a restart, profile does not
    let reopened = SessionContext::new(Arc::new(FileTokenStore::new(&path)));
    assert_eq!(reopened.token().as_deref(), Some(OWNER_TOKEN));
    assert!(reopened.profile().is_none());

    let profile = h.session.profile().unwrap();
    assert_eq!(profile.name.as_deref(), Some("Owner Motors"));
}

#[tokio::test]
async fn test_expired_token_clears_file_store() {
    let addr = serve().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let store = FileTokenStore::new(&path);
    store.set("expired").unwrap();
    let h = harness(addr, Arc::new(store));

    let decision = h.guard.check_url("/vehicles").await.unwrap();

    assert_eq!(
        decision,
        GuardDecision::Deny(DenyReason::InvalidToken { status: 401 })
    );
    assert_eq!(h.navigator.last_redirect().as_deref(), Some("/login"));
    assert!(FileTokenStore::new(&path).get().unwrap().is_none());
}

#[tokio::test]
async fn test_missing_garage_fails_closed() {
    let addr = serve().await;
    let h = harness(
        addr,
        Arc::new(garagedesk::session::MemoryTokenStore::with_token("broken")),
    );

    let decision = h.guard.check_url("/").await.unwrap();

    assert!(matches!(
        decision,
        GuardDecision::Deny(DenyReason::MalformedProfile(_))
    ));
    assert!(h.session.token().is_none());
}

#[tokio::test]
async fn test_unreachable_backend_denies() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let h = harness(
        addr,
        Arc::new(garagedesk::session::MemoryTokenStore::with_token(OWNER_TOKEN)),
    );

    let decision = h.guard.check_url("/").await.unwrap();

    assert!(matches!(decision, GuardDecision::Deny(DenyReason::Transport(_))));
    assert!(h.session.token().is_none());
    assert_eq!(h.navigator.last_redirect().as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_permissions_follow_validated_profile() {
    let addr = serve().await;
    let h = harness(
        addr,
        Arc::new(garagedesk::session::MemoryTokenStore::with_token(STARTER_TOKEN)),
    );
    let toasts = Arc::new(ToastLog::new());
    let helper = PermissionHelper::new(h.session.clone(), toasts.clone());
    let evaluator = PermissionEvaluator::new(h.session.clone());

    // Nothing is granted before the guard has run
    assert_eq!(helper.entity_permissions("vehicles"), PermissionSet::NONE);
    let mut watched = helper.watch_entity("vehicles");

    assert!(h.guard.check_url("/vehicles").await.unwrap().is_allowed());

    let starter = PermissionSet {
        view: true,
        create: false,
        edit: true,
        delete: false,
    };
    assert_eq!(watched.changed().await, Some(starter));
    assert_eq!(helper.entity_permissions("vehicles"), starter);
    assert!(evaluator.has_any_permission(["invoices:view", "vehicles:edit"]));
    assert!(!evaluator.has_all_permissions(["vehicles:view", "vehicles:delete"]));

    let set = helper.entity_permissions("vehicles");
    assert!(!helper.check_permission(set.delete, "delete vehicles"));
    assert!(helper.check_permission(set.edit, "edit vehicles"));
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts.last().unwrap().kind, ToastKind::Warning);

    // Switching accounts through a login link replaces the profile
    h.guard.check_url("/?token=owner-token").await.unwrap();
    assert_eq!(watched.changed().await, Some(PermissionSet::ALL));

    h.guard.logout();
    assert_eq!(watched.changed().await, Some(PermissionSet::NONE));
    assert!(!evaluator.has_permission("vehicles:view"));
}

#[tokio::test]
async fn test_concurrent_guard_checks_share_session() {
    let addr = serve().await;
    let h = harness(
        addr,
        Arc::new(garagedesk::session::MemoryTokenStore::with_token(OWNER_TOKEN)),
    );

    let mut handles = vec![];
    for i in 0..20 {
        let guard = h.guard.clone();
        handles.push(tokio::spawn(async move {
            guard.check_url(&format!("/vehicles/{i}")).await.unwrap()
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_allowed());
    }
    assert!(h.session.profile().is_some());
    assert!(h.navigator.events().is_empty());
}

#[tokio::test]
async fn test_history_tracks_navigation_events() {
    let history = Arc::new(NavigationHistory::new());
    let (tx, rx) = mpsc::channel(32);

    let tracker = {
        let history = history.clone();
        tokio::spawn(async move { history.track(rx).await })
    };

    for url in ["/login", "/dashboard", "/vehicles", "/system/users", "/register"] {
        tx.send(NavigationEnd::new(url)).await.unwrap();
    }
    for i in 0..12 {
        tx.send(NavigationEnd::new(format!("/jobs/{i}"))).await.unwrap();
    }
    tx.send(NavigationEnd::new("/system/audit")).await.unwrap();
    drop(tx);
    tracker.await.unwrap();

    assert_eq!(history.len(), 10);
    assert!(history.entries().iter().all(|u| !u.contains("/login")));
    assert_eq!(history.previous_url(), "/jobs/11");
    assert_eq!(history.last_non_system_url(), "/jobs/11");
}
