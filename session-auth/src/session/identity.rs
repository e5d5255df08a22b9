//! The authenticated user's identity as issued by the backend.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Identity of the signed-in user. Replaced wholesale on every login or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub user_id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<IdentityProfile>,
}

/// Optional presentation details attached to an identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl UserIdentity {
    /// Name to show for this user: the profile display name, falling back to the username.
    pub fn display_name(&self) -> &str {
        self.profile
            .as_ref()
            .and_then(|p| p.display_name.as_deref())
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.username)
    }

    /// Field-level checks applied when an identity crosses the backend boundary.
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.user_id.trim().is_empty() {
            return Err("user.userId is empty");
        }
        if self.username.trim().is_empty() {
            return Err("user.username is empty");
        }
        Ok(())
    }
}
