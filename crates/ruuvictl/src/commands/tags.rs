//! Tag command handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use ruuvictl_core::{
    CachedSnapshot, CommitOutcome, Controller, Freshness, Measurements, Session,
};

use crate::cli::{GlobalOpts, TagsArgs, TagsCommand};
use crate::error::{self, CliError};
use crate::output;

use super::util;

// ── View ────────────────────────────────────────────────────────────

/// One tag as shown to the operator: reading plus ledger state.
#[derive(Debug, Serialize)]
pub struct TagView {
    pub mac: String,
    pub name: String,
    pub enabled: bool,
    pub freshness: Freshness,
    pub stale: bool,
    pub rssi: i64,
    pub data_format: i64,
    pub last_seen: DateTime<Utc>,
    pub measurements: Measurements,
}

impl TagView {
    pub fn build(session: &Session, entry: &CachedSnapshot, now: DateTime<Utc>) -> Self {
        let snap = &entry.snapshot;
        let ledger = session.ledger();
        Self {
            mac: snap.mac.to_string(),
            name: ledger.display_name(&snap.mac),
            enabled: ledger.is_enabled(&snap.mac),
            freshness: entry.freshness(now),
            stale: entry.is_stale(),
            rssi: snap.rssi,
            data_format: snap.data_format,
            last_seen: snap.last_seen,
            measurements: snap.measurements.clone(),
        }
    }
}

/// All cached tags, sorted by MAC.
pub fn views(session: &Session, now: DateTime<Utc>) -> Vec<TagView> {
    session
        .snapshots()
        .sorted()
        .iter()
        .map(|e: &Arc<CachedSnapshot>| TagView::build(session, e, now))
        .collect()
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct TagRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Temp °C")]
    temperature: String,
    #[tabled(rename = "Hum %")]
    humidity: String,
    #[tabled(rename = "hPa")]
    pressure: String,
    #[tabled(rename = "Batt V")]
    battery: String,
    #[tabled(rename = "RSSI")]
    rssi: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl TagRow {
    pub fn new(v: &TagView, now: DateTime<Utc>, color: bool) -> Self {
        let m = &v.measurements;
        Self {
            mac: v.mac.clone(),
            name: v.name.clone(),
            enabled: output::paint_enabled(v.enabled, color),
            temperature: util::opt_f1(m.temperature),
            humidity: util::opt_f1(m.humidity),
            pressure: util::opt_f1(m.pressure.map(pa_to_hpa)),
            battery: m
                .battery_voltage
                .map_or_else(|| "-".into(), |mv| format!("{:.2}", mv / 1000.0)),
            rssi: format!("{} dBm", v.rssi),
            updated: output::paint_freshness(
                &util::format_age(v.last_seen, now),
                v.freshness,
                color,
            ),
        }
    }
}

fn pa_to_hpa(pa: f64) -> f64 {
    pa / 100.0
}

fn detail(v: &TagView) -> String {
    let m = &v.measurements;
    let mut lines = vec![
        format!("MAC:         {}", v.mac),
        format!("Name:        {}", v.name),
        format!("Enabled:     {}", if v.enabled { "yes" } else { "no" }),
        format!("Format:      {}", v.data_format),
        format!("RSSI:        {} dBm", v.rssi),
        format!("Last seen:   {} ({})", v.last_seen, v.freshness),
        format!("Temperature: {} °C", util::opt_f1(m.temperature)),
        format!("Humidity:    {} %", util::opt_f1(m.humidity)),
        format!("Pressure:    {} hPa", util::opt_f1(m.pressure.map(pa_to_hpa))),
        format!(
            "Battery:     {} V",
            m.battery_voltage
                .map_or_else(|| "-".into(), |mv| format!("{:.2}", mv / 1000.0))
        ),
        format!("TX power:    {} dBm", util::opt(m.tx_power)),
        format!("Movement:    {}", util::opt(m.movement_counter)),
        format!("Sequence #:  {}", util::opt(m.measurement_sequence_number)),
    ];
    if m.has_air_quality() {
        lines.push(format!("PM1.0:       {} µg/m³", util::opt_f1(m.pm1p0)));
        lines.push(format!("PM2.5:       {} µg/m³", util::opt_f1(m.pm2p5)));
        lines.push(format!("PM4.0:       {} µg/m³", util::opt_f1(m.pm4p0)));
        lines.push(format!("PM10:        {} µg/m³", util::opt_f1(m.pm10p0)));
        lines.push(format!("CO2:         {} ppm", util::opt_f1(m.co2)));
        lines.push(format!("VOC index:   {}", util::opt_f1(m.voc)));
        lines.push(format!("NOx index:   {}", util::opt_f1(m.nox)));
        lines.push(format!("AQI:         {}", util::opt_f1(m.air_quality_index)));
    }
    if let Some(lux) = m.illuminance {
        lines.push(format!("Illuminance: {lux:.0} lx"));
    }
    if let Some(db) = m.sound_average {
        lines.push(format!("Sound avg:   {db:.1} dBA"));
    }
    if v.stale {
        lines.push("(not seen in the latest poll)".into());
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: TagsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let session = controller.session().await?;
    let now = Utc::now();

    match args.command {
        TagsCommand::List { enabled } => {
            let color = output::should_color(&global.color);
            let mut all = views(&session, now);
            if enabled {
                all.retain(|v| v.enabled);
            }
            let out = output::render_list(
                &global.output,
                &all,
                |v| TagRow::new(v, now, color),
                |v| v.mac.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TagsCommand::Show { mac } => {
            let parsed = util::parse_mac(&mac)?;
            let entry = session
                .snapshots()
                .get(&parsed)
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "tag".into(),
                    identifier: mac,
                    list_command: "tags list".into(),
                })?;
            let view = TagView::build(&session, &entry, now);
            let out = output::render_single(&global.output, &view, detail, |v| v.mac.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TagsCommand::Enable { mac } => set_enabled(controller, &mac, true, args.apply, global).await,

        TagsCommand::Disable { mac } => {
            set_enabled(controller, &mac, false, args.apply, global).await
        }

        TagsCommand::Rename { mac, name } => {
            let parsed = util::parse_mac(&mac)?;
            controller.set_tag_name(&parsed, &name).await?;
            if !global.quiet {
                let shown = session.ledger().display_name(&parsed);
                eprintln!("✓ {parsed} is now shown as \"{shown}\"");
            }
            util::finish_mutation(controller, global, args.apply).await
        }

        TagsCommand::Edit {
            mac,
            name,
            enable,
            disable,
        } => {
            let parsed = util::parse_mac(&mac)?;
            let enabled = match (enable, disable) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };

            controller.begin_tag_edit(&parsed).await?;
            let committed = match controller.update_tag_draft(name, enabled).await {
                Ok(_) => controller.commit_edit().await,
                Err(e) => Err(e),
            };
            match committed {
                Ok(CommitOutcome::Saved) => {
                    if !global.quiet {
                        eprintln!("✓ Tag {parsed} updated");
                    }
                }
                Ok(CommitOutcome::Unchanged) => {
                    if !global.quiet {
                        eprintln!("Nothing to change for {parsed}");
                    }
                }
                Err(e) => {
                    // A failed commit leaves the draft open; this process is done with it.
                    util::discard_edit(controller).await;
                    return Err(error::for_tag(parsed.as_str())(e));
                }
            }
            util::finish_mutation(controller, global, args.apply).await
        }
    }
}

async fn set_enabled(
    controller: &Controller,
    mac: &str,
    enabled: bool,
    apply: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let parsed = util::parse_mac(mac)?;
    controller.set_tag_enabled(&parsed, enabled).await?;
    if !global.quiet {
        let verb = if enabled { "enabled" } else { "disabled" };
        eprintln!("✓ Forwarding {verb} for {parsed}");
    }
    util::finish_mutation(controller, global, apply).await
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn view(pressure: Option<f64>, battery: Option<f64>) -> TagView {
        let now = Utc::now();
        TagView {
            mac: "C1:2F:00:AA:BB:CC".into(),
            name: "Kitchen".into(),
            enabled: true,
            freshness: Freshness::Live,
            stale: false,
            rssi: -64,
            data_format: 5,
            last_seen: now - Duration::seconds(4),
            measurements: Measurements {
                temperature: Some(21.456),
                pressure,
                battery_voltage: battery,
                ..Measurements::default()
            },
        }
    }

    #[test]
    fn row_converts_units() {
        let now = Utc::now();
        let row = TagRow::new(&view(Some(100_000.0), Some(3012.0)), now, false);
        assert_eq!(row.temperature, "21.5");
        assert_eq!(row.pressure, "1000.0");
        assert_eq!(row.battery, "3.01");
        assert_eq!(row.humidity, "-");
        assert_eq!(row.rssi, "-64 dBm");
        assert_eq!(row.enabled, "yes");
        assert!(row.updated.ends_with("s ago"), "{}", row.updated);
    }

    #[test]
    fn detail_lists_air_quality_only_when_reported() {
        let plain = detail(&view(None, None));
        assert!(!plain.contains("PM2.5"));

        let mut aq = view(None, None);
        aq.measurements.pm2p5 = Some(3.0);
        aq.measurements.co2 = Some(612.0);
        let text = detail(&aq);
        assert!(text.contains("PM2.5:       3.0"));
        assert!(text.contains("CO2:         612.0 ppm"));
    }
}
