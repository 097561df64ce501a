//! Profile configuration for ruuvictl.
//!
//! TOML profiles plus `RUUVICTL_` environment overrides, translated to
//! `ruuvictl_core::PanelConfig`. The CLI layers its own flag overrides on
//! top of [`profile_to_panel_config`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ruuvictl_core::{PanelConfig, SnapshotRetention, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{profile}'")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named gateway profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by name, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Output format: "table", "json", "yaml" or "plain".
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Snapshot poll period, e.g. "2s" or "500ms".
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    PanelConfig::DEFAULT_TIMEOUT.as_secs()
}
fn default_poll_interval() -> String {
    humantime::format_duration(PanelConfig::DEFAULT_POLL_INTERVAL).to_string()
}

/// A named gateway profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Gateway base URL (e.g., "http://ruuvi-gateway.local").
    pub gateway: String,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override the insecure TLS default.
    pub insecure: Option<bool>,

    /// Override the timeout, in seconds.
    pub timeout: Option<u64>,

    /// Override the poll period (humantime).
    pub poll_interval: Option<String>,

    /// Wait after a restart before reloading (humantime).
    pub restart_grace: Option<String>,

    /// Drop a tag after this many polls without it. Unset keeps it forever.
    pub missed_poll_limit: Option<u32>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "ruuvictl", "ruuvictl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ruuvictl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
///
/// Environment keys nest on a double underscore:
/// `RUUVICTL_PROFILES__HOME__GATEWAY=http://10.0.0.5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("RUUVICTL_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `PanelConfig` from a profile and the global defaults.
pub fn profile_to_panel_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<PanelConfig, ConfigError> {
    let url: url::Url = profile
        .gateway
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "gateway".into(),
            reason: format!("invalid URL: {}", profile.gateway),
        })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = PanelConfig::new(url);
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.poll_interval = parse_duration(
        "poll_interval",
        profile.poll_interval.as_deref().unwrap_or(&defaults.poll_interval),
    )?;
    if let Some(ref grace) = profile.restart_grace {
        config.restart_grace = parse_duration("restart_grace", grace)?;
    }
    config.retention = SnapshotRetention {
        missed_poll_limit: profile.missed_poll_limit,
    };
    Ok(config)
}

fn parse_duration(field: &str, raw: &str) -> Result<Duration, ConfigError> {
    let period = humantime::parse_duration(raw.trim()).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("'{raw}': {e}"),
    })?;
    if period.is_zero() {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(period)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use pretty_assertions::assert_eq;

    fn profile(gateway: &str) -> Profile {
        Profile {
            gateway: gateway.into(),
            ..Profile::default()
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 10);
        assert_eq!(cfg.defaults.poll_interval, "2s");
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn reads_profiles_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "cabin"

[defaults]
timeout = 5

[profiles.cabin]
gateway = "http://10.0.0.5"
poll_interval = "500ms"
missed_poll_limit = 3
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        let (name, cabin) = cfg.profile(None).unwrap();
        assert_eq!(name, "cabin");
        assert_eq!(cabin.gateway, "http://10.0.0.5");

        let panel = profile_to_panel_config(cabin, &cfg.defaults).unwrap();
        assert_eq!(panel.timeout, Duration::from_secs(5));
        assert_eq!(panel.poll_interval, Duration::from_millis(500));
        assert_eq!(panel.restart_grace, PanelConfig::DEFAULT_RESTART_GRACE);
        assert_eq!(panel.retention.missed_poll_limit, Some(3));
        assert_eq!(panel.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                restart_grace: Some("5s".into()),
                ..profile("http://gw.local")
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let (_, p) = loaded.profile(None).unwrap();
        assert_eq!(p.gateway, "http://gw.local");
        assert_eq!(p.restart_grace.as_deref(), Some("5s"));
    }

    #[test]
    fn unknown_profile_is_reported() {
        let err = Config::default().profile(Some("attic")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { profile } if profile == "attic"));
    }

    #[test]
    fn tls_selection() {
        let defaults = Defaults::default();

        let mut p = profile("https://gw.local");
        p.ca_cert = Some("/etc/ca.pem".into());
        assert_eq!(
            profile_to_panel_config(&p, &defaults).unwrap().tls,
            TlsVerification::CustomCa("/etc/ca.pem".into())
        );

        p.insecure = Some(true);
        assert_eq!(
            profile_to_panel_config(&p, &defaults).unwrap().tls,
            TlsVerification::DangerAcceptInvalid
        );
    }

    #[test]
    fn rejects_bad_values() {
        let defaults = Defaults::default();
        assert!(matches!(
            profile_to_panel_config(&profile("not a url"), &defaults),
            Err(ConfigError::Validation { field, .. }) if field == "gateway"
        ));

        let mut p = profile("http://gw.local");
        p.poll_interval = Some("0s".into());
        assert!(matches!(
            profile_to_panel_config(&p, &defaults),
            Err(ConfigError::Validation { field, .. }) if field == "poll_interval"
        ));

        p.poll_interval = Some("soon".into());
        assert!(profile_to_panel_config(&p, &defaults).is_err());
    }
}
