//! CLI command definitions

use clap::{Parser, Subcommand};
use garagedesk::auth::Action;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "garagedesk")]
#[command(about = "Garage management console session tool", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the garage backend
    #[arg(long, env = "GARAGEDESK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// File holding the persisted session token
    #[arg(
        long,
        env = "GARAGEDESK_TOKEN_FILE",
        global = true,
        default_value = ".garagedesk/session.json"
    )]
    pub token_file: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store a token and validate it against the backend
    Login {
        /// Session token issued by the backend
        token: String,
    },

    /// Forget the stored token
    Logout,

    /// Run the route guard for a navigation
    ///
    /// A `token` query parameter replaces the stored token first.
    ///
    /// Examples:
    ///   garagedesk open /vehicles
    ///   garagedesk open '/approve?token=abc&activated=true&email=me%40shop.com'
    Open {
        /// Application url, e.g. /vehicles/42
        url: String,
    },

    /// Show view/create/edit/delete permissions per entity
    ///
    /// With --require, fails unless every entity grants the given actions.
    ///
    /// Examples:
    ///   garagedesk permissions vehicles customers invoices
    ///   garagedesk permissions -r edit -r delete vehicles
    Permissions {
        #[arg(required = true)]
        entities: Vec<String>,

        /// Action that must be granted: view, create, edit, delete, or all (can be repeated)
        #[arg(short, long = "require", value_parser = parse_action)]
        require: Vec<String>,

        /// Print a JSON object keyed by entity
        #[arg(long)]
        json: bool,
    },
}

fn parse_action(s: &str) -> Result<String, String> {
    match Action::parse_all(s) {
        Some(_) => Ok(s.to_lowercase()),
        None => Err(format!(
            "Invalid action: {}. Must be view, create, edit, delete, or all",
            s
        )),
    }
}
