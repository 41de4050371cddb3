//! Location command handlers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use vigil_core::{Console, Heartbeat, Liveness, Location, LocationRequest};

use crate::cli::{GlobalOpts, ListArgs, LocationsArgs, LocationsCommand};
use crate::error::CliError;
use crate::output;

use super::{util, watch};

// ── Views ───────────────────────────────────────────────────────────

/// A location with its liveness resolved, as printed in every format.
#[derive(Serialize)]
struct LocationView<'a> {
    #[serde(flatten)]
    location: &'a Location,
    liveness: Liveness,
}

#[derive(Tabled)]
struct LocationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "URL Profile")]
    url_profile: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

fn views<'a>(console: &Console, locations: &'a [Location], now: DateTime<Utc>) -> Vec<LocationView<'a>> {
    let threshold = console.config().online_threshold;
    locations
        .iter()
        .map(|location| LocationView {
            location,
            liveness: location.liveness(now, threshold),
        })
        .collect()
}

fn render(console: &Console, locations: &[Location], global: &GlobalOpts) -> String {
    let now = Utc::now();
    let color = output::should_color(global.color);
    output::render_list(
        global.output,
        &views(console, locations, now),
        |v| LocationRow {
            id: v.location.id.clone(),
            name: v.location.name.clone(),
            address: v.location.ip_address.clone().unwrap_or_else(|| "-".into()),
            url_profile: v.location.url_profile.clone().unwrap_or_else(|| "-".into()),
            enabled: if v.location.is_enabled { "yes" } else { "no" }.into(),
            status: output::paint_liveness(v.liveness, color),
            last_seen: output::last_seen(v.location.last_contact(), now),
        },
        |v| v.location.id.clone(),
    )
}

fn detail(view: &LocationView<'_>, color: bool) -> String {
    let l = view.location;
    output::detail(&[
        ("ID", l.id.clone()),
        ("Name", l.name.clone()),
        ("Address", l.ip_address.clone().unwrap_or_else(|| "-".into())),
        ("URL Profile", l.url_profile.clone().unwrap_or_else(|| "-".into())),
        ("Enabled", l.is_enabled.to_string()),
        ("Status", output::paint_liveness(view.liveness, color)),
        ("Last Handshake", l.latest_handshake_at.clone().unwrap_or_else(|| "never".into())),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    args: LocationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        LocationsCommand::List(list) => list_locations(console, list, global).await,

        LocationsCommand::Get { location } => {
            let found = console.get_location(&location).await?;
            let view = LocationView {
                liveness: found.liveness(Utc::now(), console.config().online_threshold),
                location: &found,
            };
            let color = output::should_color(global.color);
            let out = output::render_single(
                global.output,
                &view,
                |v| detail(v, color),
                |v| v.location.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        LocationsCommand::Add {
            name,
            url_profile,
            disabled,
        } => {
            let req = LocationRequest {
                name,
                url_profile,
                is_enabled: !disabled,
            };
            console.create_location(&req).await?;
            if !global.quiet {
                eprintln!("Location '{}' created", req.name);
            }
            Ok(())
        }

        LocationsCommand::Update {
            location,
            name,
            url_profile,
            enabled,
        } => {
            let current = console.get_location(&location).await?;
            let req = LocationRequest {
                name: name.unwrap_or(current.name),
                url_profile: url_profile.or(current.url_profile).unwrap_or_default(),
                is_enabled: enabled.unwrap_or(current.is_enabled),
            };
            console.update_location(&current.id, &req).await?;
            if !global.quiet {
                eprintln!("Location '{}' updated", req.name);
            }
            Ok(())
        }

        LocationsCommand::Delete { location } => {
            let found = console.get_location(&location).await?;
            if !util::confirm(&format!("Delete location '{}'?", found.name), global.yes)? {
                return Ok(());
            }
            console.delete_location(&found.id).await?;
            if !global.quiet {
                eprintln!("Location '{}' deleted", found.name);
            }
            Ok(())
        }

        LocationsCommand::Qrcode { location, download } => {
            let found = console.get_location(&location).await?;
            let bytes = console.location_qrcode(&found.id).await?;
            let target = util::save_download(&bytes, download.out, &format!("{}-qrcode.png", found.name))?;
            if !global.quiet {
                eprintln!("QR code for '{}' written to {target}", found.name);
            }
            Ok(())
        }

        LocationsCommand::Configuration { location, download } => {
            let found = console.get_location(&location).await?;
            let bytes = console.location_configuration(&found.id).await?;
            let target = util::save_download(&bytes, download.out, &format!("{}.conf", found.name))?;
            if !global.quiet {
                eprintln!("Configuration for '{}' written to {target}", found.name);
            }
            Ok(())
        }
    }
}

async fn list_locations(console: &Console, list: ListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if list.watch {
        let interval = list.interval.unwrap_or(console.config().poll_interval);
        let feed = console.watch_locations(interval);
        return watch::follow(feed, global, |items| render(console, items, global)).await;
    }

    let locations = console.list_locations().await?;
    output::print_output(&render(console, &locations, global), global.quiet);
    Ok(())
}
