//! Login, logout and whoami.

use serde::Serialize;

use vigil_config::ConfigError;
use vigil_core::{Console, CoreError, Credential, Route};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

use super::{command_for, util};

#[derive(Debug, Serialize)]
struct LoginOutcome {
    username: String,
    role: String,
    /// Console path login continues to.
    destination: String,
}

pub async fn login(
    console: &Console,
    resolved: &Resolved,
    args: LoginArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let profile = &resolved.profile_name;
    let username = args
        .username
        .or_else(|| vigil_config::resolve_username(&resolved.profile))
        .ok_or_else(|| CliError::NoUsername {
            profile: profile.clone(),
        })?;

    let password = if args.password_stdin {
        util::read_secret_stdin()?
    } else {
        match vigil_config::resolve_password(&resolved.profile, profile) {
            Ok(password) => password,
            Err(ConfigError::NoCredentials { .. }) => {
                util::prompt_secret(&format!("Password for {username}: "))?
            }
            Err(e) => return Err(e.into()),
        }
    };

    let destination = console
        .login(&username, &password)
        .await
        .map_err(|e| match e {
            CoreError::InvalidCredentials => CliError::AuthFailed {
                profile: profile.clone(),
            },
            other => other.into(),
        })?;

    let outcome = LoginOutcome {
        role: console
            .current_user()
            .map(|c| c.role.to_string())
            .unwrap_or_default(),
        username,
        destination,
    };
    let out = output::render_single(
        global.output,
        &outcome,
        |o| {
            let mut text = format!("Logged in as {} ({})", o.username, o.role);
            let next = Route::from_path(&o.destination)
                .filter(|r| *r != Route::Home)
                .and_then(command_for);
            if let Some(next) = next {
                text.push_str(&format!("\nContinue with: {next}"));
            }
            text
        },
        |o| o.destination.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn logout(console: &Console, global: &GlobalOpts) -> Result<(), CliError> {
    let who = console.current_user().map(|c| c.username);
    console.logout().await?;
    if !global.quiet {
        match who {
            Some(name) => eprintln!("Logged out {name}"),
            None => eprintln!("No active session"),
        }
    }
    Ok(())
}

pub fn whoami(console: &Console, global: &GlobalOpts) -> Result<(), CliError> {
    let Some(credential) = console.current_user() else {
        return Err(CliError::SessionExpired);
    };
    let out = output::render_single(
        global.output,
        &credential,
        |c: &Credential| {
            output::detail(&[
                ("User ID", c.user_id.clone()),
                ("Username", c.username.clone()),
                ("Role", c.role.to_string()),
                ("Backend", console.config().url.to_string()),
            ])
        },
        |c| c.username.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
