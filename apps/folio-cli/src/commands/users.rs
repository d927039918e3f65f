use serde_json::json;

use folio_core::domain::{NewUser, UserId, UserPatch};
use folio_core::services::AccountAdmin;

use crate::cli::{OutputFormat, UserCommand};
use crate::confirm::confirm;
use crate::output::{self, Table};
use crate::state::AppState;

pub async fn handle(
    action: UserCommand,
    state: &AppState,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let accounts = AccountAdmin::for_current_user(state.directory.clone()).await?;

    match action {
        UserCommand::List => {
            let users = accounts.list_users().await?;
            output::print(&users, format, || output::users_table(&users))
        }
        UserCommand::Create {
            username,
            email,
            password,
            role,
        } => {
            let user = accounts
                .create_user(NewUser {
                    username,
                    email,
                    password,
                    role,
                })
                .await?;
            output::print(&user, format, || output::user_record(&user))
        }
        UserCommand::Update {
            id,
            username,
            email,
            role,
        } => {
            let patch = UserPatch {
                username,
                email,
                role,
            };
            if patch.is_empty() {
                anyhow::bail!("Nothing to update: pass --username, --email or --role");
            }
            let user = accounts.update_user(&UserId::new(id), patch).await?;
            output::print(&user, format, || output::user_record(&user))
        }
        UserCommand::Delete { id, yes } => {
            let id = UserId::new(id);
            confirm(&format!("delete user {id}"), yes)?;
            accounts.delete_user(&id).await?;
            output::print(&json!({ "id": &id, "deleted": true }), format, || {
                Table::record(vec![("deleted", id.to_string())])
            })
        }
        UserCommand::Password { current, new } => {
            accounts.change_password(&current, &new).await?;
            output::print(&json!({ "passwordChanged": true }), format, || {
                Table::record(vec![("password", "changed".to_string())])
            })
        }
    }
}
