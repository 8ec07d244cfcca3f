//! Token validation against the garage backend

use super::guard::{TokenValidator, ValidationError};
use crate::session::GarageProfile;
use async_trait::async_trait;
use garagedesk_client::{ClientError, GarageApiClient};

impl From<ClientError> for ValidationError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Rejected { status } => ValidationError::Rejected(status),
            ClientError::Transport(msg) => ValidationError::Transport(msg),
            ClientError::InvalidUrl(msg) => ValidationError::Transport(msg),
            ClientError::Serialization(e) => ValidationError::Malformed(e.to_string()),
        }
    }
}

#[async_trait]
impl TokenValidator for GarageApiClient {
    async fn validate(&self, token: &str) -> Result<GarageProfile, ValidationError> {
        Ok(self.validate_token(token).await?)
    }
}
