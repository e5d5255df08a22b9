use colored::*;
use domain::users::{PagedResponse, User};
use chrono::Duration;
use session_auth::oidc::{OidcProvider, PendingAttempt};
use session_auth::session::Session;

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_step(message: &str) {
    println!("{} {}", "→".blue(), message);
}

pub fn print_providers(providers: &[OidcProvider]) {
    if providers.is_empty() {
        println!("{} No identity providers are configured", "!".yellow());
        return;
    }
    for provider in providers {
        println!(
            "  {:<20} {} ({})",
            provider.provider_id.bright_white().bold(),
            provider.display_name,
            provider.provider_type.as_str()
        );
    }
}

pub fn print_session(session: &Session) {
    let Some(user) = session.user.as_ref().filter(|_| session.is_authenticated()) else {
        println!("{} Not signed in", "!".yellow());
        return;
    };

    println!("{}", user.display_name().bright_white().bold());
    println!("  user id:  {}", user.user_id);
    println!("  username: {}", user.username);
    println!("  email:    {}", user.email);
    let roles: Vec<&str> = user.roles.iter().map(String::as_str).collect();
    println!("  roles:    {}", roles.join(", "));
    match session.time_until_expiry() {
        Some(left) if left > Duration::zero() => {
            println!("  access token: expires in {} min", left.num_minutes())
        }
        Some(_) => println!("  access token: {}", "expired, refreshed on next request".dimmed()),
        None => {}
    }
}

pub fn print_pending(attempt: &PendingAttempt) {
    println!(
        "{} Login with {} started {} is waiting for its callback",
        "→".blue(),
        attempt.provider_id,
        attempt.created_at.to_rfc3339()
    );
}

pub fn print_user(user: &User) {
    println!(
        "{} {}",
        user.display_name().bright_white().bold(),
        format!("[{}]", user.status).dimmed()
    );
    println!("  user id:  {}", user.user_id);
    println!("  username: {}", user.username);
    println!("  email:    {}", user.email);
    println!("  roles:    {}", user.roles.join(", "));
    if let Some(last_login_at) = user.last_login_at {
        println!("  last login: {}", last_login_at.to_rfc3339());
    }
    if let Some(identities) = &user.federated_identities {
        for identity in identities {
            println!(
                "  linked:   {} as {} since {}",
                identity.provider_id,
                identity
                    .provider_username
                    .as_deref()
                    .unwrap_or(&identity.provider_user_id),
                identity.linked_at.format("%Y-%m-%d")
            );
        }
    }
}

pub fn print_user_page(page: &PagedResponse<User>) {
    for user in &page.content {
        println!(
            "  {:<38} {:<20} {:<32} {}",
            user.user_id,
            user.username.bright_white(),
            user.email,
            user.status
        );
    }
    let pageable = &page.pageable;
    println!(
        "{}",
        format!(
            "page {} of {} ({} users)",
            pageable.page_number + 1,
            pageable.total_pages.max(1),
            pageable.total_elements
        )
        .dimmed()
    );
}
