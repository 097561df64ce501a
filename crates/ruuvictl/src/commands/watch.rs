//! Live tag view: polls the gateway and redraws on every refresh.

use std::io::IsTerminal;

use chrono::Utc;

use ruuvictl_core::{Controller, Session};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::tags::{self, TagRow};

pub async fn handle(
    controller: &Controller,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let session = controller.session().await?;
    let mut updates = session.snapshots().subscribe();
    let redraw = matches!(global.output, OutputFormat::Table) && std::io::stdout().is_terminal();

    render(&session, global, redraw)?;
    controller.start_polling().await?;
    tracing::debug!(interval = ?controller.config().poll_interval, "watching");

    let mut remaining = args.count;
    loop {
        if remaining == Some(0) {
            break;
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                render(&session, global, redraw)?;
                remaining = remaining.map(|n| n.saturating_sub(1));
            }
        }
    }

    controller.stop_polling().await;
    Ok(())
}

fn render(session: &Session, global: &GlobalOpts, redraw: bool) -> Result<(), CliError> {
    let now = Utc::now();
    let color = output::should_color(&global.color);
    let views = tags::views(session, now);
    let out = output::render_list(
        &global.output,
        &views,
        |v| TagRow::new(v, now, color),
        |v| v.mac.clone(),
    )?;
    if redraw {
        // Clear screen and home the cursor.
        print!("\x1b[2J\x1b[H");
        println!("{} tags, updated {}", views.len(), now.format("%H:%M:%S"));
    }
    output::print_output(&out, global.quiet);
    Ok(())
}
