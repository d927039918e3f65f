//! Command handlers - one module per command group.

pub mod auth;
pub mod images;
pub mod posts;
pub mod users;

use crate::cli::{Commands, OutputFormat};
use crate::state::AppState;

/// Route a parsed command to its handler.
pub async fn dispatch(
    command: Commands,
    state: &AppState,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        Commands::Login { email, password } => {
            auth::login(&email, &password, state, format).await
        }
        Commands::Register {
            username,
            email,
            password,
            role,
        } => auth::register(&username, &email, &password, role, state, format).await,
        Commands::Whoami => auth::whoami(state, format).await,
        Commands::Posts { action } => posts::handle(action, state, format).await,
        Commands::Images { action } => images::handle(action, state, format).await,
        Commands::Users { action } => users::handle(action, state, format).await,
    }
}
