//! `--watch` mode: redraw a polled list until Ctrl-C or the session ends.

use std::io::{self, IsTerminal, Write};

use tracing::warn;
use vigil_core::{CoreError, ListFeed};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Render every update of `feed`.
///
/// A failed refresh keeps the last good output on screen and polling goes
/// on; a 403 also prints a notice. Only an expired session ends the loop.
pub async fn follow<T, F>(mut feed: ListFeed<T>, global: &GlobalOpts, render: F) -> Result<(), CliError>
where
    T: Send + Sync + 'static,
    F: Fn(&[T]) -> String,
{
    let redraw = global.output == OutputFormat::Table && io::stdout().is_terminal();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                feed.cancel();
                return Ok(());
            }
            state = feed.changed() => {
                let Some(state) = state else {
                    return Ok(());
                };
                if let Some(err) = state.error.as_deref() {
                    if err.is_unauthenticated() {
                        return Err(CliError::SessionExpired);
                    }
                    if let CoreError::Forbidden { message } = err {
                        warn!(%message, "refresh refused, keeping last result");
                        if !global.quiet {
                            eprintln!("Permission denied: {message} (still watching)");
                        }
                    } else {
                        warn!(error = %err, "refresh failed, keeping last result");
                    }
                    continue;
                }

                let rendered = render(state.items.as_slice());
                if redraw {
                    let mut stdout = io::stdout().lock();
                    let _ = write!(stdout, "{CLEAR_SCREEN}");
                    let _ = stdout.flush();
                }
                output::print_output(&rendered, global.quiet);
            }
        }
    }
}
