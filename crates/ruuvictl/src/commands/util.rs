//! Shared helpers for command handlers.

use std::io::IsTerminal;

use chrono::{DateTime, Utc};

use ruuvictl_core::{Controller, MacAddress, SinkId};

use crate::cli::GlobalOpts;
use crate::error::CliError;

use super::restart;

/// Parse and validate a tag MAC from the command line.
pub fn parse_mac(raw: &str) -> Result<MacAddress, CliError> {
    let mac = MacAddress::new(raw);
    if mac.is_valid() {
        Ok(mac)
    } else {
        Err(CliError::Validation {
            field: "mac".into(),
            reason: format!("'{raw}' is not a MAC address"),
        })
    }
}

/// Accepts section keys (`mqtt_publisher`) and short names (`mqtt`).
pub fn parse_sink(raw: &str) -> Result<SinkId, CliError> {
    SinkId::parse(&raw.to_ascii_lowercase()).map_err(|_| CliError::NotFound {
        resource_type: "sink".into(),
        identifier: raw.into(),
        list_command: "sinks list".into(),
    })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.trim_end_matches('?').into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// After a saved change: restart right away with `--apply`, otherwise
/// remind the operator that the gateway still runs the old settings.
pub async fn finish_mutation(
    controller: &Controller,
    global: &GlobalOpts,
    apply: bool,
) -> Result<(), CliError> {
    if !controller.restart_required().await {
        return Ok(());
    }
    if apply {
        return restart::restart(controller, global, true).await;
    }
    if !global.quiet {
        eprintln!("  Restart the gateway to apply: ruuvictl restart");
    }
    Ok(())
}

/// Drop whatever draft a failed command left open.
///
/// Returns whether a draft was discarded.
pub async fn discard_edit(controller: &Controller) -> bool {
    match controller.cancel_edit().await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "no draft discarded");
            false
        }
    }
}

/// Short relative age, e.g. "12s ago", "3m ago", "2h ago".
pub fn format_age(last_seen: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = now.signed_duration_since(last_seen).num_seconds().max(0);
    match secs {
        0..60 => format!("{secs}s ago"),
        60..3600 => format!("{}m ago", secs / 60),
        3600..86_400 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86_400),
    }
}

/// Matter manual pairing code in groups of four: `3497-0112-332`.
pub fn format_pairing_code(code: &str) -> String {
    let digits: Vec<char> = code.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
    digits
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

/// `-` for absent values.
pub fn opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

/// One decimal place, or `-`.
pub fn opt_f1(value: Option<f64>) -> String {
    value.map_or_else(|| "-".into(), |v| format!("{v:.1}"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::Duration;

    use super::*;

    #[test]
    fn ages() {
        let now = Utc::now();
        assert_eq!(format_age(now - Duration::seconds(7), now), "7s ago");
        assert_eq!(format_age(now - Duration::seconds(59), now), "59s ago");
        assert_eq!(format_age(now - Duration::seconds(61), now), "1m ago");
        assert_eq!(format_age(now - Duration::hours(5), now), "5h ago");
        assert_eq!(format_age(now - Duration::days(3), now), "3d ago");
        // A gateway clock slightly ahead still reads as fresh.
        assert_eq!(format_age(now + Duration::seconds(2), now), "0s ago");
    }

    #[test]
    fn pairing_code_groups() {
        assert_eq!(format_pairing_code("34970112332"), "3497-0112-332");
        assert_eq!(format_pairing_code("3497-0112-332"), "3497-0112-332");
        assert_eq!(format_pairing_code(""), "");
    }

    #[test]
    fn mac_and_sink_parsing() {
        assert_eq!(parse_mac("aa-bb-cc-dd-ee-ff").unwrap().as_str(), "AA:BB:CC:DD:EE:FF");
        assert!(matches!(parse_mac("kitchen"), Err(CliError::Validation { .. })));

        assert_eq!(parse_sink("MQTT").unwrap(), SinkId::Mqtt);
        assert_eq!(parse_sink("influxdb3_publisher").unwrap(), SinkId::InfluxDb3);
        assert!(matches!(parse_sink("http"), Err(CliError::NotFound { .. })));
    }

    #[tokio::test]
    async fn discarding_without_a_draft_is_harmless() {
        let url = url::Url::parse("http://127.0.0.1:9").unwrap();
        let controller = Controller::new(ruuvictl_core::PanelConfig::new(url)).unwrap();
        assert!(!discard_edit(&controller).await);
    }
}
