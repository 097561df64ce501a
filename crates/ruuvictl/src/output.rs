//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use ruuvictl_core::Freshness;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Green for live readings, yellow for aging, dimmed for stale ones.
pub fn paint_freshness(text: &str, freshness: Freshness, color: bool) -> String {
    if !color {
        return text.to_owned();
    }
    match freshness {
        Freshness::Live => text.green().to_string(),
        Freshness::Aging => text.yellow().to_string(),
        Freshness::StaleButShown => text.dimmed().to_string(),
    }
}

pub fn paint_enabled(enabled: bool, color: bool) -> String {
    let text = if enabled { "yes" } else { "no" };
    match (color, enabled) {
        (false, _) => text.to_owned(),
        (true, true) => text.green().to_string(),
        (true, false) => text.red().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted string,
/// since single-item detail views don't use `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Internal {
        message: format!("failed to render JSON: {e}"),
    })
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Internal {
        message: format!("failed to render YAML: {e}"),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Item {
        mac: &'static str,
        rssi: i64,
    }

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "MAC")]
        mac: String,
    }

    fn items() -> Vec<Item> {
        vec![
            Item { mac: "AA:00:00:00:00:01", rssi: -70 },
            Item { mac: "AA:00:00:00:00:02", rssi: -81 },
        ]
    }

    fn render(format: &OutputFormat) -> String {
        render_list(
            format,
            &items(),
            |i| Row { mac: i.mac.into() },
            |i| i.mac.into(),
        )
        .unwrap()
    }

    #[test]
    fn plain_emits_one_id_per_line() {
        assert_eq!(render(&OutputFormat::Plain), "AA:00:00:00:00:01\nAA:00:00:00:00:02");
    }

    #[test]
    fn json_keeps_all_fields() {
        let out = render(&OutputFormat::JsonCompact);
        assert_eq!(
            out,
            r#"[{"mac":"AA:00:00:00:00:01","rssi":-70},{"mac":"AA:00:00:00:00:02","rssi":-81}]"#
        );
    }

    #[test]
    fn table_has_headers() {
        let out = render(&OutputFormat::Table);
        assert!(out.contains("MAC"));
        assert!(out.contains("AA:00:00:00:00:02"));
    }

    #[test]
    fn colorless_painting_is_identity() {
        assert_eq!(paint_freshness("5s ago", Freshness::Live, false), "5s ago");
        assert_eq!(paint_enabled(false, false), "no");
    }
}
