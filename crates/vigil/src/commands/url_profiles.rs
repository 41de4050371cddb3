//! URL profile command handlers.

use std::path::Path;

use tabled::Tabled;

use vigil_core::{Console, UrlProfile, UrlTemplate};

use crate::cli::{GlobalOpts, ListArgs, UrlProfilesArgs, UrlProfilesCommand};
use crate::error::CliError;
use crate::output;

use super::{util, watch};

const EXPORT_FILE: &str = "url-profiles.json";

#[derive(Tabled)]
struct UrlProfileRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Links")]
    links: String,
}

impl From<&UrlProfile> for UrlProfileRow {
    fn from(p: &UrlProfile) -> Self {
        Self {
            name: p.name.clone(),
            links: p
                .urls
                .iter()
                .map(|u| u.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn render(profiles: &[UrlProfile], global: &GlobalOpts) -> String {
    output::render_list(
        global.output,
        profiles,
        |p| UrlProfileRow::from(p),
        |p| p.name.clone(),
    )
}

fn detail(profile: &UrlProfile) -> String {
    let mut lines = vec![format!("Name: {}", profile.name)];
    if profile.urls.is_empty() {
        lines.push("  (no links)".into());
    }
    for url in &profile.urls {
        lines.push(format!("  {}  {}", url.name, url.template));
    }
    lines.join("\n")
}

/// Parse `NAME=TEMPLATE` link arguments.
fn parse_templates(raw: &[String]) -> Result<Vec<UrlTemplate>, CliError> {
    raw.iter()
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(name, template)| UrlTemplate::new(name.trim(), template.trim()))
                .ok_or_else(|| CliError::Validation {
                    field: "url".into(),
                    reason: format!("expected NAME=TEMPLATE, got '{entry}'"),
                })
        })
        .collect()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| EXPORT_FILE.into(), |n| n.to_string_lossy().into_owned())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    args: UrlProfilesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        UrlProfilesCommand::List(list) => list_profiles(console, list, global).await,

        UrlProfilesCommand::Get { name } => {
            let profile = console.get_url_profile(&name).await?;
            let out = output::render_single(global.output, &profile, detail, |p| p.name.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UrlProfilesCommand::Add {
            name,
            urls,
            from_file,
        } => {
            let profile = match from_file {
                Some(path) => util::read_json_file::<UrlProfile>(&path)?,
                None => UrlProfile::new(name.unwrap_or_default(), parse_templates(&urls)?),
            };
            console.create_url_profile(&profile).await?;
            if !global.quiet {
                eprintln!("URL profile '{}' created", profile.name);
            }
            Ok(())
        }

        UrlProfilesCommand::Update {
            name,
            rename,
            urls,
            from_file,
        } => {
            let profile = match from_file {
                Some(path) => util::read_json_file::<UrlProfile>(&path)?,
                None => {
                    let mut current = console.get_url_profile(&name).await?;
                    if let Some(new_name) = rename {
                        current.name = new_name;
                    }
                    if !urls.is_empty() {
                        current.urls = parse_templates(&urls)?;
                    }
                    current
                }
            };
            console.update_url_profile(&name, &profile).await?;
            if !global.quiet {
                eprintln!("URL profile '{}' updated", profile.name);
            }
            Ok(())
        }

        UrlProfilesCommand::Delete { name } => {
            if !util::confirm(&format!("Delete URL profile '{name}'?"), global.yes)? {
                return Ok(());
            }
            console.delete_url_profile(&name).await?;
            if !global.quiet {
                eprintln!("URL profile '{name}' deleted");
            }
            Ok(())
        }

        UrlProfilesCommand::Import { file } => {
            let contents = std::fs::read(&file)?;
            console
                .import_url_profiles(&file_name(&file), contents)
                .await?;
            if !global.quiet {
                eprintln!("Imported {}", file.display());
            }
            Ok(())
        }

        UrlProfilesCommand::Export { download } => {
            let bytes = console.export_url_profiles().await?;
            let target = util::save_download(&bytes, download.out, EXPORT_FILE)?;
            if !global.quiet {
                eprintln!("URL profiles written to {target}");
            }
            Ok(())
        }
    }
}

async fn list_profiles(console: &Console, list: ListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if list.watch {
        let interval = list.interval.unwrap_or(console.config().poll_interval);
        let feed = console.watch_url_profiles(interval);
        return watch::follow(feed, global, |items| render(items, global)).await;
    }

    let profiles = console.list_url_profiles().await?;
    output::print_output(&render(&profiles, global), global.quiet);
    Ok(())
}
