//! Home board: every location with its status and rendered quick links.

use chrono::Utc;
use tabled::Tabled;

use vigil_core::{BoardRow, Console, Heartbeat};

use crate::cli::{GlobalOpts, ListArgs};
use crate::error::CliError;
use crate::output;

use super::watch;

#[derive(Tabled)]
struct LinkRow {
    #[tabled(rename = "Location")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
    #[tabled(rename = "Links")]
    links: String,
}

fn render(rows: &[BoardRow], global: &GlobalOpts) -> String {
    let now = Utc::now();
    let color = output::should_color(global.color);
    output::render_list(
        global.output,
        rows,
        |r| LinkRow {
            name: r.location.name.clone(),
            status: output::paint_liveness(r.liveness, color),
            last_seen: output::last_seen(r.location.last_contact(), now),
            links: if r.links.is_empty() {
                "-".into()
            } else {
                r.links
                    .iter()
                    .map(|l| format!("{}: {}", l.name, l.url))
                    .collect::<Vec<_>>()
                    .join("\n")
            },
        },
        |r| {
            r.links
                .iter()
                .map(|l| format!("{}\t{}\t{}", r.location.name, l.name, l.url))
                .collect::<Vec<_>>()
                .join("\n")
        },
    )
}

pub async fn handle(console: &Console, args: ListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.watch {
        let interval = args.interval.unwrap_or(console.config().home_poll_interval);
        let feed = console.watch_board(interval);
        return watch::follow(feed, global, |rows| render(rows, global)).await;
    }

    let rows = console.board().await?;
    output::print_output(&render(&rows, global), global.quiet);
    Ok(())
}
