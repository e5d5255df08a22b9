//! Identity providers offered by the backend.

use serde::{Deserialize, Serialize};

/// Federation protocol spoken by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProviderType {
    Oidc,
    Saml,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Oidc => "OIDC",
            ProviderType::Saml => "SAML",
        }
    }
}

/// A configured identity provider. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OidcProvider {
    pub provider_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    pub display_name: String,
    #[serde(default = "default_provider_type")]
    pub provider_type: ProviderType,
    pub enabled: bool,
}

fn default_provider_type() -> ProviderType {
    ProviderType::Oidc
}
