//! Payload types exchanged with the garage backend
//!
//! Only the fields the console relies on are typed. Everything else on the
//! garage object is kept in `extra` so nothing the backend sends is lost.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Body returned by the validation endpoint on success
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidateTokenResponse {
    pub garage: GarageProfile,
}

/// The authenticated garage account as seen by the console
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GarageProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Missing or null subscriptions deserialize as an empty plan
    #[serde(default, deserialize_with = "null_as_default")]
    pub subscription: GarageSubscription,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GarageProfile {
    /// Build a profile holding exactly the given capability tokens
    pub fn with_permissions<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subscription: GarageSubscription {
                plan: SubscriptionPlan {
                    name: None,
                    permissions: permissions.into_iter().map(Into::into).collect(),
                },
            },
            ..Default::default()
        }
    }

    /// Capability tokens granted by the current plan
    pub fn permissions(&self) -> &BTreeSet<String> {
        &self.subscription.plan.permissions
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GarageSubscription {
    #[serde(default, deserialize_with = "null_as_default")]
    pub plan: SubscriptionPlan,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub permissions: BTreeSet<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
