use anyhow::{bail, Result};
use domain::users::{CreateUserRequest, UpdateUserRequest, UserFilters, UserProfile};
use domain::{user, ApiClient};
use log::*;
use service::AppState;
use session_auth::oidc::{CallbackOutcome, CallbackParams, FlowCoordinator};

use crate::cli::{CallbackArgs, CreateArgs, ListArgs, ProfileArgs, UpdateArgs, UsersCommand};
use crate::output::*;

pub async fn providers(flow: &FlowCoordinator) -> Result<()> {
    match flow.discover().await {
        Ok(providers) => print_providers(&providers),
        Err(e) if e.is_provider_unavailable() => {
            warn!("Identity providers could not be loaded: {}", e);
            print_providers(&[]);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub async fn login(flow: &FlowCoordinator, provider_id: &str) -> Result<()> {
    print_step(&format!("Starting login with {provider_id}..."));
    let redirect = flow.initiate(provider_id).await?;
    debug!("Pending login attempt saved for {}", redirect.provider_id);
    print_step("After signing in, pass the URL you are redirected to to `auth-admin callback`");
    Ok(())
}

pub async fn callback(flow: &FlowCoordinator, args: CallbackArgs) -> Result<()> {
    let params = match (args.redirect_url, args.code, args.state) {
        (Some(redirect_url), _, _) => CallbackParams::from_redirect_url(&redirect_url)?,
        (None, Some(code), Some(state)) => CallbackParams::authorized(code, state),
        _ => bail!("pass the redirect URL or both --code and --state"),
    };

    match flow.handle_callback(params).await? {
        CallbackOutcome::Authenticated(user) => {
            print_success(&format!("Signed in as {}", user.username));
        }
        CallbackOutcome::AlreadyProcessed => {
            print_step("This login was already completed");
        }
    }
    Ok(())
}

pub fn whoami(app_state: &AppState) -> Result<()> {
    print_session(&app_state.session.snapshot());
    if let Some(attempt) = app_state.pending_attempts().peek()? {
        print_pending(&attempt);
    }
    Ok(())
}

pub async fn logout(flow: &FlowCoordinator) -> Result<()> {
    flow.logout().await;
    print_success("Signed out");
    Ok(())
}

pub async fn users(client: &ApiClient, command: UsersCommand) -> Result<()> {
    match command {
        UsersCommand::List(args) => list_users(client, args).await,
        UsersCommand::Show { user_id } => {
            let user = user::find_by_id(client, &user_id).await?;
            print_user(&user);
            Ok(())
        }
        UsersCommand::Create(args) => create_user(client, args).await,
        UsersCommand::Update(args) => update_user(client, args).await,
        UsersCommand::Delete { user_id } => {
            user::delete(client, &user_id).await?;
            print_success(&format!("Deleted user {user_id}"));
            Ok(())
        }
        UsersCommand::Permissions { user_id } => {
            let permissions = user::find_permissions(client, &user_id).await?;
            for permission in permissions {
                println!("  {permission}");
            }
            Ok(())
        }
        UsersCommand::AssignRoles { user_id, roles } => {
            let user = user::assign_roles(client, &user_id, roles).await?;
            print_success(&format!("Roles of {} set to {}", user.username, user.roles.join(", ")));
            Ok(())
        }
    }
}

async fn list_users(client: &ApiClient, args: ListArgs) -> Result<()> {
    let filters = UserFilters {
        search: args.search,
        status: args.status,
        role: args.role,
        start_date: args.start_date,
        end_date: args.end_date,
    };
    let page = user::find_by(client, args.page, args.size, &filters).await?;
    print_user_page(&page);
    Ok(())
}

async fn create_user(client: &ApiClient, args: CreateArgs) -> Result<()> {
    let profile = profile_from_args(args.profile);
    let request = CreateUserRequest {
        username: args.username,
        email: args.email,
        password: args.password,
        profile: (!profile.is_empty()).then_some(profile),
        roles: (!args.roles.is_empty()).then_some(args.roles),
        status: args.status,
    };
    let user = user::create(client, &request).await?;
    print_success(&format!("Created user {} ({})", user.username, user.user_id));
    Ok(())
}

async fn update_user(client: &ApiClient, args: UpdateArgs) -> Result<()> {
    let profile = profile_from_args(args.profile);
    let request = UpdateUserRequest {
        email: args.email,
        status: args.status,
        profile: (!profile.is_empty()).then_some(profile),
        roles: None,
    };
    let user = user::update(client, &args.user_id, &request).await?;
    print_success(&format!("Updated user {}", user.username));
    print_user(&user);
    Ok(())
}

fn profile_from_args(args: ProfileArgs) -> UserProfile {
    UserProfile {
        first_name: args.first_name,
        last_name: args.last_name,
        display_name: args.display_name,
        phone_number: args.phone_number,
        timezone: args.timezone,
        locale: args.locale,
        ..Default::default()
    }
}
