//! User administration through the authenticated API client.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use crate::users::{CreateUserRequest, PagedResponse, UpdateUserRequest, User, UserFilters};
use log::*;
use session_auth::api::response::{decode_json, ensure_success};
use session_auth::http::ApiClient;

const BASE_PATH: &str = "/users";

pub const DEFAULT_PAGE_SIZE: u32 = 10;

fn user_path(user_id: &str) -> Result<String, Error> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Invalid(
                "user id must not be empty".to_string(),
            )),
        });
    }
    Ok(format!("{}/{}", BASE_PATH, urlencoding::encode(user_id)))
}

/// One page of users matching `filters`. Pages are zero-based.
pub async fn find_by(
    client: &ApiClient,
    page: u32,
    size: u32,
    filters: &UserFilters,
) -> Result<PagedResponse<User>, Error> {
    debug!("Listing users page={page} size={size} filters={filters:?}");
    let response = client
        .get(BASE_PATH)
        .query(&[("page", page.to_string()), ("size", size.to_string())])
        .query(&filters.to_query())
        .send()
        .await?;

    Ok(decode_json(response).await?)
}

pub async fn find_by_id(client: &ApiClient, user_id: &str) -> Result<User, Error> {
    let response = client.get(&user_path(user_id)?).send().await?;
    Ok(decode_json(response).await?)
}

pub async fn create(client: &ApiClient, request: &CreateUserRequest) -> Result<User, Error> {
    info!("Creating user {}", request.username);
    let response = client.post(BASE_PATH).json(request).send().await?;
    Ok(decode_json(response).await?)
}

pub async fn update(
    client: &ApiClient,
    user_id: &str,
    request: &UpdateUserRequest,
) -> Result<User, Error> {
    let path = user_path(user_id)?;
    if request.is_empty() {
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Invalid(
                "update carries no changes".to_string(),
            )),
        });
    }

    info!("Updating user {user_id}");
    let response = client.patch(&path).json(request).send().await?;
    Ok(decode_json(response).await?)
}

pub async fn delete(client: &ApiClient, user_id: &str) -> Result<(), Error> {
    let path = user_path(user_id)?;
    info!("Deleting user {user_id}");
    let response = client.delete(&path).send().await?;
    ensure_success(response).await?;
    Ok(())
}

/// Effective permissions granted to the user through their roles.
pub async fn find_permissions(client: &ApiClient, user_id: &str) -> Result<Vec<String>, Error> {
    let path = format!("{}/permissions", user_path(user_id)?);
    let response = client.get(&path).send().await?;
    Ok(decode_json(response).await?)
}

/// Replace the user's roles.
pub async fn assign_roles(
    client: &ApiClient,
    user_id: &str,
    roles: Vec<String>,
) -> Result<User, Error> {
    let request = UpdateUserRequest {
        roles: Some(roles),
        ..Default::default()
    };
    update(client, user_id, &request).await
}
