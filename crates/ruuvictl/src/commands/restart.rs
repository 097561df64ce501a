//! Restart handler.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use ruuvictl_core::Controller;

use crate::cli::GlobalOpts;
use crate::error::CliError;

use super::util;

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    restart(controller, global, false).await
}

/// Restart the gateway and wait until it answers again.
///
/// `pre_confirmed` skips the prompt (`--apply` on a mutating command).
pub async fn restart(
    controller: &Controller,
    global: &GlobalOpts,
    pre_confirmed: bool,
) -> Result<(), CliError> {
    if !pre_confirmed && !util::confirm("Restart the gateway now?", global.yes)? {
        return Ok(());
    }

    controller.request_restart().await?;

    let spinner = if global.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} {elapsed}") {
        spinner.set_style(style);
    }
    spinner.set_message("Restarting gateway");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = controller.confirm_restart().await;
    spinner.finish_and_clear();
    result?;

    if !global.quiet {
        let tags = controller.session().await.map(|s| s.snapshots().len()).unwrap_or(0);
        eprintln!("✓ Gateway restarted ({tags} tags in range)");
    }
    Ok(())
}
