//! Command dispatch: bridges CLI args -> controller calls -> output formatting.

pub mod bridge;
pub mod config_cmd;
pub mod restart;
pub mod sinks;
pub mod tags;
pub mod util;
pub mod watch;

use ruuvictl_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a gateway-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Tags(args) => tags::handle(controller, args, global).await,
        Command::Sinks(args) => sinks::handle(controller, args, global).await,
        Command::Bridge(args) => bridge::handle(controller, args, global).await,
        Command::Restart => restart::handle(controller, global).await,
        Command::Watch(args) => watch::handle(controller, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal {
            message: "command does not talk to the gateway".into(),
        }),
    }
}
