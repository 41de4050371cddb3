//! Command dispatch: gates each command on the session's role, then hands
//! it to the matching handler.

pub mod auth;
pub mod clients;
pub mod config_cmd;
pub mod links;
pub mod locations;
pub mod url_profiles;
pub mod users;
pub mod util;
pub mod watch;

use vigil_core::{Console, Decision, Route};

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    console: &Console,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(console, resolved, args, global).await,
        Command::Logout => auth::logout(console, global).await,
        Command::Whoami => {
            enter(console, resolved, Route::Home)?;
            auth::whoami(console, global)
        }
        Command::Links(args) => {
            enter(console, resolved, Route::Home)?;
            links::handle(console, args, global).await
        }
        Command::Users(args) => {
            enter(console, resolved, Route::Users)?;
            users::handle(console, args, global).await
        }
        Command::Locations(args) => {
            enter(console, resolved, Route::Locations)?;
            locations::handle(console, args, global).await
        }
        Command::Clients(args) => {
            enter(console, resolved, Route::Clients)?;
            clients::handle(console, args, global).await
        }
        Command::UrlProfiles(args) => {
            enter(console, resolved, Route::UrlProfiles)?;
            url_profiles::handle(console, args, global).await
        }
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

/// Run the role gate for `route`. A refused entry becomes the matching
/// CLI error; a login redirect has already been remembered by the gate.
fn enter(console: &Console, resolved: &Resolved, route: Route) -> Result<(), CliError> {
    match console.navigate(route) {
        Decision::Proceed => Ok(()),
        Decision::RedirectToLogin => Err(CliError::NotLoggedIn {
            profile: resolved.profile_name.clone(),
        }),
        Decision::RedirectToHome => {
            let allowed: Vec<String> = route
                .allowed_roles()
                .iter()
                .map(ToString::to_string)
                .collect();
            Err(CliError::PermissionDenied {
                message: format!("`{route}` requires role {}", allowed.join(" or ")),
            })
        }
    }
}

/// The command that shows `route`, used to point at where login continues.
pub fn command_for(route: Route) -> Option<&'static str> {
    match route {
        Route::Login => None,
        Route::Home => Some("vigil links"),
        Route::Users => Some("vigil users list"),
        Route::Locations => Some("vigil locations list"),
        Route::UrlProfiles => Some("vigil url-profiles list"),
        Route::Clients => Some("vigil clients list"),
    }
}
