//! User account model as exchanged with the identity backend.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
    Locked,
    PendingVerification,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "ACTIVE",
            UserStatus::Inactive => "INACTIVE",
            UserStatus::Suspended => "SUSPENDED",
            UserStatus::Locked => "LOCKED",
            UserStatus::PendingVerification => "PENDING_VERIFICATION",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UserStatusParseError;

impl fmt::Display for UserStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "expected one of ACTIVE, INACTIVE, SUSPENDED, LOCKED, PENDING_VERIFICATION"
        )
    }
}

impl std::error::Error for UserStatusParseError {}

impl FromStr for UserStatus {
    type Err = UserStatusParseError;
    fn from_str(status: &str) -> Result<UserStatus, Self::Err> {
        match status.to_uppercase().replace('-', "_").as_str() {
            "ACTIVE" => Ok(UserStatus::Active),
            "INACTIVE" => Ok(UserStatus::Inactive),
            "SUSPENDED" => Ok(UserStatus::Suspended),
            "LOCKED" => Ok(UserStatus::Locked),
            "PENDING_VERIFICATION" => Ok(UserStatus::PendingVerification),
            _ => Err(UserStatusParseError),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, serde_json::Value>>,
}

impl UserProfile {
    pub fn is_empty(&self) -> bool {
        self == &UserProfile::default()
    }
}

/// Link between a local account and an identity at an external provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedIdentity {
    pub provider_id: String,
    pub provider_user_id: String,
    #[serde(default)]
    pub provider_username: Option<String>,
    pub linked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub status: UserStatus,
    #[serde(default)]
    pub profile: UserProfile,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub federated_identities: Option<Vec<FederatedIdentity>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Profile display name, falling back to first and last name, then username.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.profile.display_name {
            return name.clone();
        }
        match (&self.profile.first_name, &self.profile.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    /// Omitted for accounts that only sign in through a federated provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
}

/// Partial update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self == &UpdateUserRequest::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilters {
    pub search: Option<String>,
    pub status: Option<UserStatus>,
    pub role: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl UserFilters {
    /// Query parameters for `GET /users`, omitting unset filters.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(search) = self.search.as_ref().filter(|s| !s.trim().is_empty()) {
            query.push(("search", search.trim().to_string()));
        }
        if let Some(status) = self.status {
            query.push(("status", status.to_string()));
        }
        if let Some(role) = &self.role {
            query.push(("role", role.clone()));
        }
        if let Some(start_date) = self.start_date {
            query.push(("startDate", start_date.format("%Y-%m-%d").to_string()));
        }
        if let Some(end_date) = self.end_date {
            query.push(("endDate", end_date.format("%Y-%m-%d").to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pageable {
    pub page_number: u32,
    pub page_size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub last: bool,
    pub first: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub content: Vec<T>,
    pub pageable: Pageable,
}
