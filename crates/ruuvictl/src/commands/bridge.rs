//! Matter bridge handlers.

use serde::Serialize;

use ruuvictl_core::Controller;

use crate::cli::{BridgeArgs, BridgeCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Debug, Serialize)]
struct PairingView {
    pairing_code: String,
    manual_code: String,
    qr_payload: String,
}

fn detail(v: &PairingView) -> String {
    [
        format!("Pairing code: {}", v.manual_code),
        format!("QR payload:   {}", v.qr_payload),
        String::new(),
        "Add the bridge in your Matter controller app with either value.".into(),
    ]
    .join("\n")
}

pub async fn handle(
    controller: &Controller,
    args: BridgeArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        BridgeCommand::Status => {
            let status = controller
                .bridge_status()
                .await?
                .ok_or(CliError::BridgeDisabled)?;
            let view = PairingView {
                manual_code: util::format_pairing_code(&status.pairing_code),
                pairing_code: status.pairing_code,
                qr_payload: status.qr_payload,
            };
            let out = output::render_single(&global.output, &view, detail, |v| {
                v.manual_code.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
