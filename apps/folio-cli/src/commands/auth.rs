use serde_json::json;

use folio_core::DomainError;
use folio_core::domain::Role;

use crate::cli::OutputFormat;
use crate::output::{self, Table};
use crate::state::AppState;

pub async fn login(
    email: &str,
    password: &str,
    state: &AppState,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let (user, token) = state.login(email, password).await?;
    let value = json!({ "user": &user, "token": &token });
    output::print(&value, format, || {
        Table::record(vec![
            ("username", user.username.clone()),
            ("role", user.role.as_str().to_string()),
            ("token", token.clone()),
        ])
    })
}

pub async fn register(
    username: &str,
    email: &str,
    password: &str,
    role: Option<Role>,
    state: &AppState,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let (user, token) = state.register(username, email, password, role).await?;
    let value = json!({ "user": &user, "token": &token });
    output::print(&value, format, || {
        Table::record(vec![
            ("id", user.id.to_string()),
            ("username", user.username.clone()),
            ("token", token.clone()),
        ])
    })
}

pub async fn whoami(state: &AppState, format: OutputFormat) -> anyhow::Result<()> {
    let user = state
        .directory
        .current_user()
        .await
        .map_err(DomainError::from)?;
    output::print(&user, format, || output::user_record(&user))
}
