use anyhow::Result;
use log::*;
use service::{init_storage, logging::Logger, AppState};
use session_auth::Navigator;
use std::sync::Arc;

mod cli;
mod commands;
mod navigator;
mod output;

use cli::{Cli, Command};
use navigator::ConsoleNavigator;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::new();

    Logger::init_logger(&cli.config);
    info!("Identity backend: {}", cli.config.api_base_url());

    let storage = init_storage(&cli.config)?;
    let app_state = AppState::new(cli.config, &storage)?;
    let navigator: Arc<dyn Navigator> = Arc::new(ConsoleNavigator);

    match cli.command {
        Command::Providers => commands::providers(&app_state.flow_coordinator(navigator)).await,
        Command::Login { provider_id } => {
            commands::login(&app_state.flow_coordinator(navigator), &provider_id).await
        }
        Command::Callback(args) => {
            commands::callback(&app_state.flow_coordinator(navigator), args).await
        }
        Command::Logout => commands::logout(&app_state.flow_coordinator(navigator)).await,
        Command::Whoami => commands::whoami(&app_state),
        Command::Users(command) => {
            let client = app_state.api_client(navigator)?;
            commands::users(&client, command).await
        }
    }
}
