//! Garagedesk CLI entry point

mod cli;

use crate::cli::{Cli, Commands};
use anyhow::{Context, Result};
use clap::Parser;
use garagedesk::auth::{Action, PermissionHelper, PermissionSet};
use garagedesk::notify::ToastLog;
use garagedesk::router::{GuardDecision, NavigationLog, NavigatorEvent, Route, RouteGuard};
use garagedesk::session::{FileTokenStore, SessionContext};
use garagedesk_client::{ApiConfig, GarageApiClient};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let session = SessionContext::new(Arc::new(FileTokenStore::new(&cli.token_file)));

    // Only commands that talk to the backend need a base URL
    let api_config = || -> Result<ApiConfig> {
        let env = ApiConfig::from_env();
        match (&cli.api_url, env) {
            (Some(url), Some(mut config)) => {
                config.base_url = url.clone();
                Ok(config)
            }
            (Some(url), None) => Ok(ApiConfig::new(url.clone())),
            (None, Some(config)) => Ok(config),
            (None, None) => anyhow::bail!("GARAGEDESK_API_URL or --api-url required"),
        }
    };

    match cli.command {
        Commands::Login { token } => login(session, api_config()?, token).await,
        Commands::Logout => logout(session),
        Commands::Open { url } => open(session, api_config()?, url).await,
        Commands::Permissions {
            entities,
            require,
            json,
        } => permissions(session, api_config()?, entities, require, json).await,
    }
}

struct Console {
    guard: RouteGuard,
    navigator: Arc<NavigationLog>,
}

impl Console {
    fn new(session: SessionContext, config: ApiConfig) -> Result<Self> {
        let client = GarageApiClient::new(config).context("Invalid API configuration")?;
        let navigator = Arc::new(NavigationLog::new());
        let guard = RouteGuard::new(session, Arc::new(client), navigator.clone());
        Ok(Self { guard, navigator })
    }

    fn print_navigation(&self) {
        for event in self.navigator.events() {
            match event {
                NavigatorEvent::Navigate(path) => println!("Redirected to {}", path),
                NavigatorEvent::ReplaceUrl(url) => println!("Address rewritten to {}", url),
            }
        }
    }
}

async fn login(session: SessionContext, config: ApiConfig, token: String) -> Result<()> {
    session
        .set_token(&token)
        .context("Failed to store token")?;

    let console = Console::new(session, config)?;
    match console.guard.check_url("/").await? {
        GuardDecision::Allow => {
            let profile = console.guard.session().profile();
            let name = profile
                .as_ref()
                .and_then(|p| p.name.clone())
                .unwrap_or_else(|| "(unnamed garage)".to_string());
            println!("Logged in as {}", name);
            Ok(())
        }
        GuardDecision::Deny(reason) => anyhow::bail!("Login failed: {}", reason),
    }
}

fn logout(session: SessionContext) -> Result<()> {
    session.logout();
    println!("Logged out");
    Ok(())
}

async fn open(session: SessionContext, config: ApiConfig, url: String) -> Result<()> {
    let route = Route::resolve(&url);
    if !route.is_guarded() {
        match route {
            Route::Redirect(target) => println!("Not an app path, redirected to {}", target),
            other => println!("Public route: {:?}", other),
        }
        return Ok(());
    }

    let console = Console::new(session, config)?;
    let decision = console
        .guard
        .check_url(&url)
        .await
        .with_context(|| format!("Invalid url: {}", url))?;
    console.print_navigation();

    match decision {
        GuardDecision::Allow => println!("Allowed: {:?}", route),
        GuardDecision::Deny(reason) => println!("Denied: {}", reason),
    }
    Ok(())
}

async fn permissions(
    session: SessionContext,
    config: ApiConfig,
    entities: Vec<String>,
    require: Vec<String>,
    json: bool,
) -> Result<()> {
    // The profile is never persisted, so fetch it through the guard first
    let console = Console::new(session.clone(), config)?;
    if let GuardDecision::Deny(reason) = console.guard.check_url("/").await? {
        anyhow::bail!("Not authenticated: {}", reason);
    }

    let toasts = Arc::new(ToastLog::new());
    let helper = PermissionHelper::new(session, toasts.clone());
    info!(entities = entities.len(), "Resolving permissions");

    if !require.is_empty() {
        let mut actions = Vec::new();
        for action in &require {
            let parsed = Action::parse_all(action)
                .ok_or_else(|| anyhow::anyhow!("Invalid action: {}", action))?;
            actions.extend(parsed);
        }
        actions.sort();
        actions.dedup();

        let denied = entities
            .iter()
            .filter(|entity| !helper.check_actions(entity, &actions))
            .count();
        for toast in toasts.drain() {
            println!("{}: {}", toast.title, toast.message);
        }
        if denied > 0 {
            anyhow::bail!("{} of {} entities lack required actions", denied, entities.len());
        }
    }

    if json {
        let sets: BTreeMap<&str, PermissionSet> = entities
            .iter()
            .map(|e| (e.as_str(), helper.entity_permissions(e)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&sets)?);
        return Ok(());
    }

    println!("{:<16} {:<6} {:<6} {:<6} {:<6}", "ENTITY", "VIEW", "CREATE", "EDIT", "DELETE");
    for entity in &entities {
        let set = helper.entity_permissions(entity);
        println!(
            "{:<16} {:<6} {:<6} {:<6} {:<6}",
            entity, set.view, set.create, set.edit, set.delete
        );
    }
    Ok(())
}
