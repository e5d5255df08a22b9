use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use domain::users::UserStatus;
use service::config::Config;

#[derive(Parser)]
#[command(name = "auth-admin")]
#[command(about = "Administrative client for the identity service")]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn new() -> Self {
        // Load .env file first
        dotenvy::dotenv().ok();
        // Then parse the command line parameters and flags
        Cli::parse()
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// List the identity providers available for login
    Providers,
    /// Start a login with an identity provider
    Login {
        /// Provider ID as shown by `providers`
        provider_id: String,
    },
    /// Complete a login with the URL the identity provider redirected to
    Callback(CallbackArgs),
    /// End the current session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Manage user accounts
    #[command(subcommand)]
    Users(UsersCommand),
}

#[derive(Args)]
pub struct CallbackArgs {
    /// Full redirect URL, e.g. http://localhost:5173/auth/callback?code=...&state=...
    #[arg(required_unless_present_all = ["code", "state"], conflicts_with_all = ["code", "state"])]
    pub redirect_url: Option<String>,

    /// Authorization code, when not passing the redirect URL
    #[arg(long, requires = "state")]
    pub code: Option<String>,

    /// State value, when not passing the redirect URL
    #[arg(long, requires = "code")]
    pub state: Option<String>,
}

#[derive(Subcommand)]
pub enum UsersCommand {
    /// List users, one page at a time
    List(ListArgs),
    /// Show a single user
    Show { user_id: String },
    /// Create a user
    Create(CreateArgs),
    /// Update a user's email, status or profile
    Update(UpdateArgs),
    /// Delete a user
    Delete { user_id: String },
    /// Show a user's effective permissions
    Permissions { user_id: String },
    /// Replace a user's roles
    AssignRoles {
        user_id: String,
        #[arg(required = true)]
        roles: Vec<String>,
    },
}

#[derive(Args)]
pub struct ListArgs {
    /// Zero-based page number
    #[arg(long, default_value_t = 0)]
    pub page: u32,

    #[arg(long, default_value_t = domain::user::DEFAULT_PAGE_SIZE)]
    pub size: u32,

    /// Free-text search over username, email and name
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long)]
    pub status: Option<UserStatus>,

    #[arg(long)]
    pub role: Option<String>,

    /// Only users created on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Only users created on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub display_name: Option<String>,
    #[arg(long)]
    pub phone_number: Option<String>,
    #[arg(long)]
    pub timezone: Option<String>,
    #[arg(long)]
    pub locale: Option<String>,
}

#[derive(Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub email: String,
    /// Initial password; omit for federated-only accounts
    #[arg(long, env = "NEW_USER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Role to grant; repeat for several
    #[arg(long = "role")]
    pub roles: Vec<String>,
    #[arg(long)]
    pub status: Option<UserStatus>,
    #[command(flatten)]
    pub profile: ProfileArgs,
}

#[derive(Args)]
pub struct UpdateArgs {
    pub user_id: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub status: Option<UserStatus>,
    #[command(flatten)]
    pub profile: ProfileArgs,
}
