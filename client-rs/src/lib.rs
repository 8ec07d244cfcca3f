//! Garage API Rust Client
//!
//! HTTP client for the garage backend. The console only needs one call from
//! it: validating a bearer token and receiving the garage profile (including
//! the subscription plan and its capability tokens) in return.
//!
//! # Example
//!
//! ```no_run
//! use garagedesk_client::{ApiConfig, GarageApiClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GarageApiClient::new(ApiConfig::new("https://api.example.com"))?;
//!
//!     let garage = client.validate_token("your-token").await?;
//!     println!("plan grants {} capabilities", garage.permissions().len());
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod messages;

pub use client::GarageApiClient;
pub use config::{ApiConfig, DEFAULT_VALIDATE_PATH};
pub use error::{ClientError, Result};
pub use messages::{GarageProfile, GarageSubscription, SubscriptionPlan, ValidateTokenResponse};
