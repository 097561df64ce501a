//! Clap derive structures for the `ruuvictl` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ruuvictl -- control panel for Ruuvi BLE gateways
#[derive(Debug, Parser)]
#[command(
    name = "ruuvictl",
    version,
    about = "Manage a Ruuvi gateway from the command line",
    long_about = "Inspect RuuviTag readings, choose which tags the gateway forwards,\n\
        configure its data sinks, and restart it to apply changes.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Gateway profile to use
    #[arg(long, short = 'p', env = "RUUVICTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Gateway URL (overrides profile)
    #[arg(long, short = 'g', env = "RUUVICTL_GATEWAY", global = true)]
    pub gateway: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "RUUVICTL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "RUUVICTL_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "RUUVICTL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Discovered tags, their names and forwarding state
    #[command(alias = "t")]
    Tags(TagsArgs),

    /// Data sinks the gateway forwards readings to
    #[command(alias = "s")]
    Sinks(SinksArgs),

    /// Matter bridge pairing information
    Bridge(BridgeArgs),

    /// Restart the gateway so saved changes take effect
    Restart,

    /// Live view of tag readings
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TAGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TagsArgs {
    /// Restart the gateway after a successful change
    #[arg(long, global = true)]
    pub apply: bool,

    #[command(subcommand)]
    pub command: TagsCommand,
}

#[derive(Debug, Subcommand)]
pub enum TagsCommand {
    /// List discovered tags with their latest readings
    #[command(alias = "ls")]
    List {
        /// Only tags the gateway forwards
        #[arg(long)]
        enabled: bool,
    },

    /// Show every measurement of one tag
    Show {
        /// Tag MAC address
        mac: String,
    },

    /// Forward this tag's readings to the sinks
    Enable {
        /// Tag MAC address
        mac: String,
    },

    /// Stop forwarding this tag's readings
    Disable {
        /// Tag MAC address
        mac: String,
    },

    /// Give a tag a display name (an empty name removes it)
    Rename {
        /// Tag MAC address
        mac: String,
        /// New name
        name: String,
    },

    /// Change a tag's name and forwarding state in one edit
    Edit {
        /// Tag MAC address
        mac: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// Forward the tag
        #[arg(long, conflicts_with = "disable")]
        enable: bool,
        /// Stop forwarding the tag
        #[arg(long)]
        disable: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SINKS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SinksArgs {
    /// Restart the gateway after a successful change
    #[arg(long, global = true)]
    pub apply: bool,

    #[command(subcommand)]
    pub command: SinksCommand,
}

#[derive(Debug, Subcommand)]
pub enum SinksCommand {
    /// List all sinks and whether they are enabled
    #[command(alias = "ls")]
    List,

    /// Show one sink's settings
    Show {
        /// Sink: mqtt, influxdb, influxdb3, prometheus or matter
        sink: String,
    },

    /// Switch a sink on, filling unset fields with defaults
    Enable {
        /// Sink: mqtt, influxdb, influxdb3, prometheus or matter
        sink: String,
    },

    /// Switch a sink off
    Disable {
        /// Sink: mqtt, influxdb, influxdb3, prometheus or matter
        sink: String,
    },

    /// Change sink settings (e.g. `sinks set mqtt broker_url=tcp://broker:1883`)
    Set {
        /// Sink: mqtt, influxdb, influxdb3, prometheus or matter
        sink: String,
        /// Settings as KEY=VALUE pairs; values are parsed as JSON when possible
        #[arg(required = true, value_parser = parse_key_value)]
        settings: Vec<(String, String)>,
    },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  BRIDGE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct BridgeArgs {
    #[command(subcommand)]
    pub command: BridgeCommand,
}

#[derive(Debug, Subcommand)]
pub enum BridgeCommand {
    /// Show the pairing code and QR payload
    Status,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll period (overrides profile), e.g. "5s"
    #[arg(long, short = 'i', value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// Stop after this many refreshes
    #[arg(long, short = 'n')]
    pub count: Option<u32>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a value on the active profile
    Set {
        /// Profile key (gateway, timeout, insecure, ca_cert, poll_interval,
        /// restart_grace, missed_poll_limit)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn key_value_pairs() {
        assert_eq!(
            parse_key_value("broker_url=tcp://b:1883").unwrap(),
            ("broker_url".into(), "tcp://b:1883".into())
        );
        assert_eq!(parse_key_value("username=").unwrap().1, "");
        assert!(parse_key_value("port").is_err());
        assert!(parse_key_value("=1").is_err());
    }

    #[test]
    fn edit_flags_conflict() {
        let parsed = Cli::try_parse_from([
            "ruuvictl", "tags", "edit", "AA:BB:CC:DD:EE:FF", "--enable", "--disable",
        ]);
        assert!(parsed.is_err());
    }
}
