//! User account command handlers.

use tabled::Tabled;

use vigil_core::{Console, CoreError, CreateUserRequest, Role, UpdateUserRequest, User};

use crate::cli::{GlobalOpts, ListArgs, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::{util, watch};

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Role")]
    role: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            username: u.username.clone(),
            role: u
                .roles
                .iter()
                .map(Role::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn render(users: &[User], global: &GlobalOpts) -> String {
    output::render_list(global.output, users, |u| UserRow::from(u), |u| u.id.clone())
}

/// Find a user by id, then by username.
async fn find_user(console: &Console, key: &str) -> Result<User, CliError> {
    let mut users = console.list_users().await?;
    let index = users
        .iter()
        .position(|u| u.id == key)
        .or_else(|| users.iter().position(|u| u.username == key))
        .ok_or_else(|| {
            CliError::from(CoreError::NotFound {
                entity_type: "user".into(),
                identifier: key.into(),
            })
        })?;
    Ok(users.swap_remove(index))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(console: &Console, args: UsersArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        UsersCommand::List(list) => list_users(console, list, global).await,

        UsersCommand::Add {
            username,
            role,
            password_stdin,
        } => {
            let req = CreateUserRequest {
                username,
                role: Role::new(role.as_str()),
                password: util::new_password(password_stdin)?,
            };
            console.create_user(&req).await?;
            if !global.quiet {
                eprintln!("User '{}' created with role {}", req.username, req.role);
            }
            Ok(())
        }

        UsersCommand::Update {
            user,
            username,
            role,
            password,
            password_stdin,
        } => {
            let current = find_user(console, &user).await?;
            let role = match role {
                Some(role) => Role::new(role.as_str()),
                None => current
                    .primary_role()
                    .cloned()
                    .unwrap_or_else(|| Role::new(Role::NORMAL)),
            };
            let password = if password || password_stdin {
                Some(util::new_password(password_stdin)?)
            } else {
                None
            };
            let req = UpdateUserRequest {
                username: username.unwrap_or(current.username),
                role,
                password,
            };
            console.update_user(&current.id, &req).await?;
            if !global.quiet {
                eprintln!("User '{}' updated", req.username);
            }
            Ok(())
        }

        UsersCommand::Delete { user } => {
            let found = find_user(console, &user).await?;
            if !util::confirm(&format!("Delete user '{}'?", found.username), global.yes)? {
                return Ok(());
            }
            console.delete_user(&found.id).await?;
            if !global.quiet {
                eprintln!("User '{}' deleted", found.username);
            }
            Ok(())
        }
    }
}

async fn list_users(console: &Console, list: ListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if list.watch {
        let interval = list.interval.unwrap_or(console.config().poll_interval);
        let feed = console.watch_users(interval);
        return watch::follow(feed, global, |items| render(items, global)).await;
    }

    let users = console.list_users().await?;
    output::print_output(&render(&users, global), global.quiet);
    Ok(())
}
