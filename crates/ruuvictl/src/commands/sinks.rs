//! Sink command handlers.

use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use ruuvictl_core::{CommitOutcome, Controller, CoreError, Session, SinkConfig, SinkId};

use crate::cli::{GlobalOpts, SinksArgs, SinksCommand};
use crate::error::CliError;
use crate::output;

use super::util;

/// Fields never echoed back to the terminal.
const SECRET_FIELDS: &[&str] = &["password", "auth_token"];

// ── View ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SinkView {
    id: SinkId,
    label: &'static str,
    /// Whether the document has a section for this sink at all.
    configured: bool,
    enabled: bool,
    endpoint: Option<String>,
    minimum_interval: Option<String>,
    settings: Value,
}

impl SinkView {
    fn build(id: SinkId, config: Option<&SinkConfig>) -> Result<Self, CoreError> {
        let settings = match config {
            Some(c) => redact(c.to_value()?),
            None => Value::Null,
        };
        Ok(Self {
            id,
            label: id.label(),
            configured: config.is_some(),
            enabled: config.is_some_and(SinkConfig::is_enabled),
            endpoint: config.and_then(SinkConfig::endpoint),
            minimum_interval: config
                .and_then(SinkConfig::minimum_interval)
                .map(|d| humantime::format_duration(d).to_string()),
            settings,
        })
    }
}

fn redact(mut value: Value) -> Value {
    if let Value::Object(ref mut map) = value {
        for (key, v) in map.iter_mut() {
            let secret = SECRET_FIELDS.iter().any(|s| key.eq_ignore_ascii_case(s));
            if secret && v.as_str().is_some_and(|s| !s.is_empty()) {
                *v = Value::String("****".into());
            }
        }
    }
    value
}

fn views(session: &Session) -> Result<Vec<SinkView>, CoreError> {
    SinkId::all()
        .map(|id| SinkView::build(id, session.config().sink(id).as_ref()))
        .collect()
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SinkRow {
    #[tabled(rename = "Sink")]
    id: String,
    #[tabled(rename = "Name")]
    label: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Interval")]
    interval: String,
}

fn row(v: &SinkView, color: bool) -> SinkRow {
    SinkRow {
        id: v.id.to_string(),
        label: v.label.into(),
        enabled: if v.configured {
            output::paint_enabled(v.enabled, color)
        } else {
            "-".into()
        },
        endpoint: util::opt(v.endpoint.as_deref()),
        interval: util::opt(v.minimum_interval.as_deref()),
    }
}

fn detail(v: &SinkView) -> String {
    let mut lines = vec![
        format!("Sink:     {} ({})", v.label, v.id),
        format!(
            "Enabled:  {}",
            match (v.configured, v.enabled) {
                (false, _) => "not configured",
                (true, true) => "yes",
                (true, false) => "no",
            }
        ),
    ];
    if let Value::Object(map) = &v.settings {
        lines.push(String::new());
        let width = map.keys().map(String::len).max().unwrap_or(0);
        for (key, value) in map {
            if key.eq_ignore_ascii_case("enabled") {
                continue;
            }
            let shown = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            lines.push(format!("{key:width$}  {shown}"));
        }
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: SinksArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let session = controller.session().await?;

    match args.command {
        SinksCommand::List => {
            let color = output::should_color(&global.color);
            let all = views(&session)?;
            let out = output::render_list(
                &global.output,
                &all,
                |v| row(v, color),
                |v| v.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SinksCommand::Show { sink } => {
            let id = util::parse_sink(&sink)?;
            let view = SinkView::build(id, session.config().sink(id).as_ref())?;
            let out = output::render_single(&global.output, &view, detail, |v| v.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SinksCommand::Enable { sink } => {
            let id = util::parse_sink(&sink)?;
            edit(controller, id, global, args.apply, |c| Ok(c.with_enabled(true))).await
        }

        SinksCommand::Disable { sink } => {
            let id = util::parse_sink(&sink)?;
            edit(controller, id, global, args.apply, |c| Ok(c.with_enabled(false))).await
        }

        SinksCommand::Set { sink, settings } => {
            let id = util::parse_sink(&sink)?;
            edit(controller, id, global, args.apply, |c| {
                settings
                    .iter()
                    .try_fold(c, |acc, (key, value)| acc.with_field(key, value))
            })
            .await
        }
    }
}

/// Run one sink change through an edit session: open, modify, commit.
async fn edit(
    controller: &Controller,
    id: SinkId,
    global: &GlobalOpts,
    apply: bool,
    change: impl FnOnce(SinkConfig) -> Result<SinkConfig, CoreError>,
) -> Result<(), CliError> {
    let draft = controller.begin_sink_edit(id).await?;

    let committed = match change(draft.config) {
        Ok(updated) => match controller.update_sink_draft(updated).await {
            Ok(_) => controller.commit_edit().await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };

    let outcome = match committed {
        Ok(outcome) => outcome,
        Err(e) => {
            util::discard_edit(controller).await;
            return Err(e.into());
        }
    };

    if !global.quiet {
        match outcome {
            CommitOutcome::Saved => eprintln!("✓ {} saved", id.label()),
            CommitOutcome::Unchanged => eprintln!("{} already has these settings", id.label()),
        }
    }
    util::finish_mutation(controller, global, apply).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn secrets_are_masked() {
        let cfg = SinkConfig::from_value(
            SinkId::Mqtt,
            json!({ "enabled": true, "username": "gw", "password": "hunter2" }),
        )
        .unwrap();
        let view = SinkView::build(SinkId::Mqtt, Some(&cfg)).unwrap();
        assert_eq!(view.settings["password"], "****");
        assert_eq!(view.settings["username"], "gw");
    }

    #[test]
    fn empty_secret_stays_empty() {
        let cfg =
            SinkConfig::from_value(SinkId::InfluxDb, json!({ "enabled": true, "auth_token": "" }))
                .unwrap();
        let view = SinkView::build(SinkId::InfluxDb, Some(&cfg)).unwrap();
        assert_eq!(view.settings["auth_token"], "");
    }

    #[test]
    fn missing_section_is_not_configured() {
        let view = SinkView::build(SinkId::Matter, None).unwrap();
        assert!(!view.configured);
        assert!(!view.enabled);
        assert!(detail(&view).contains("not configured"));
        assert_eq!(row(&view, false).enabled, "-");
    }

    #[test]
    fn detail_lists_settings() {
        let cfg = SinkConfig::default_for(SinkId::Prometheus);
        let view = SinkView::build(SinkId::Prometheus, Some(&cfg)).unwrap();
        let text = detail(&view);
        assert!(text.contains("Port"), "{text}");
        assert!(text.contains("2112"), "{text}");
        assert_eq!(row(&view, false).endpoint, ":2112/metrics");
    }
}
