//! VPN client command handlers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use vigil_core::{Client, ClientRequest, Console, Heartbeat, Liveness};

use crate::cli::{ClientsArgs, ClientsCommand, GlobalOpts, ListArgs};
use crate::error::CliError;
use crate::output;

use super::{util, watch};

// ── Views ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ClientView<'a> {
    #[serde(flatten)]
    client: &'a Client,
    liveness: Liveness,
}

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

fn view<'a>(console: &Console, client: &'a Client, now: DateTime<Utc>) -> ClientView<'a> {
    ClientView {
        client,
        liveness: client.liveness(now, console.config().online_threshold),
    }
}

fn render(console: &Console, clients: &[Client], global: &GlobalOpts) -> String {
    let now = Utc::now();
    let color = output::should_color(global.color);
    let views: Vec<ClientView<'_>> = clients.iter().map(|c| view(console, c, now)).collect();
    output::render_list(
        global.output,
        &views,
        |v| ClientRow {
            id: v.client.id.clone(),
            name: v.client.name.clone(),
            address: v.client.ip_address.clone().unwrap_or_else(|| "-".into()),
            status: output::paint_liveness(v.liveness, color),
            last_seen: output::last_seen(v.client.last_contact(), now),
        },
        |v| v.client.id.clone(),
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    args: ClientsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ClientsCommand::List(list) => list_clients(console, list, global).await,

        ClientsCommand::Get { client } => {
            let found = console.get_client(&client).await?;
            let color = output::should_color(global.color);
            let out = output::render_single(
                global.output,
                &view(console, &found, Utc::now()),
                |v| {
                    output::detail(&[
                        ("ID", v.client.id.clone()),
                        ("Name", v.client.name.clone()),
                        ("Address", v.client.ip_address.clone().unwrap_or_else(|| "-".into())),
                        ("Status", output::paint_liveness(v.liveness, color)),
                        (
                            "Last Handshake",
                            v.client
                                .latest_handshake_at
                                .clone()
                                .unwrap_or_else(|| "never".into()),
                        ),
                    ])
                },
                |v| v.client.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Add { name } => {
            let req = ClientRequest { name };
            console.create_client(&req).await?;
            if !global.quiet {
                eprintln!("Client '{}' created", req.name);
            }
            Ok(())
        }

        ClientsCommand::Update { client, name } => {
            let current = console.get_client(&client).await?;
            console
                .update_client(&current.id, &ClientRequest { name: name.clone() })
                .await?;
            if !global.quiet {
                eprintln!("Client '{}' renamed to '{name}'", current.name);
            }
            Ok(())
        }

        ClientsCommand::Delete { client } => {
            let found = console.get_client(&client).await?;
            if !util::confirm(&format!("Delete client '{}'?", found.name), global.yes)? {
                return Ok(());
            }
            console.delete_client(&found.id).await?;
            if !global.quiet {
                eprintln!("Client '{}' deleted", found.name);
            }
            Ok(())
        }

        ClientsCommand::Qrcode { client, download } => {
            let found = console.get_client(&client).await?;
            let bytes = console.client_qrcode(&found.id).await?;
            let target = util::save_download(&bytes, download.out, &format!("{}-qrcode.png", found.name))?;
            if !global.quiet {
                eprintln!("QR code for '{}' written to {target}", found.name);
            }
            Ok(())
        }

        ClientsCommand::Configuration { client, download } => {
            let found = console.get_client(&client).await?;
            let bytes = console.client_configuration(&found.id).await?;
            let target = util::save_download(&bytes, download.out, &format!("{}.conf", found.name))?;
            if !global.quiet {
                eprintln!("Configuration for '{}' written to {target}", found.name);
            }
            Ok(())
        }
    }
}

async fn list_clients(console: &Console, list: ListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if list.watch {
        let interval = list.interval.unwrap_or(console.config().poll_interval);
        let feed = console.watch_clients(interval);
        return watch::follow(feed, global, |items| render(console, items, global)).await;
    }

    let clients = console.list_clients().await?;
    output::print_output(&render(console, &clients, global), global.quiet);
    Ok(())
}
