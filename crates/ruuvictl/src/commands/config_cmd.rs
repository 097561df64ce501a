//! Config subcommand handlers.

use dialoguer::{Confirm, Input};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

fn format_config(cfg: &Config) -> Result<String, CliError> {
    toml::to_string_pretty(cfg)
        .map(|text| text.trim_end().to_owned())
        .map_err(|e| CliError::Internal {
            message: format!("failed to render config: {e}"),
        })
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

fn check_duration(field: &str, value: &str) -> Result<(), CliError> {
    humantime::parse_duration(value)
        .map(|_| ())
        .map_err(|e| invalid(field, format!("'{value}': {e}")))
}

/// Apply one `config set` key to a profile.
fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "gateway" => {
            url::Url::parse(&value).map_err(|_| invalid("gateway", format!("invalid URL: {value}")))?;
            profile.gateway = value;
        }
        "insecure" => {
            profile.insecure =
                Some(value.parse().map_err(|_| invalid("insecure", "must be 'true' or 'false'"))?);
        }
        "timeout" => {
            profile.timeout =
                Some(value.parse().map_err(|_| invalid("timeout", "must be a number (seconds)"))?);
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "poll_interval" | "poll-interval" => {
            check_duration("poll_interval", &value)?;
            profile.poll_interval = Some(value);
        }
        "restart_grace" | "restart-grace" => {
            check_duration("restart_grace", &value)?;
            profile.restart_grace = Some(value);
        }
        "missed_poll_limit" | "missed-poll-limit" => {
            profile.missed_poll_limit = if value.is_empty() || value == "none" {
                None
            } else {
                Some(
                    value
                        .parse()
                        .map_err(|_| invalid("missed_poll_limit", "must be a whole number or 'none'"))?,
                )
            };
        }
        other => {
            return Err(invalid(
                other,
                format!(
                    "unknown config key '{other}'. Valid keys: gateway, insecure, timeout, \
                     ca_cert, poll_interval, restart_grace, missed_poll_limit"
                ),
            ));
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("ruuvictl configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = config::load_config_or_default();

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            if cfg.profiles.contains_key(&profile_name)
                && !Confirm::new()
                    .with_prompt(format!("Profile '{profile_name}' exists. Overwrite?"))
                    .default(false)
                    .interact()
                    .map_err(prompt_err)?
            {
                return Ok(());
            }

            let mut profile = Profile::default();
            let gateway: String = Input::new()
                .with_prompt("Gateway URL")
                .default("http://ruuvi-gateway.local".into())
                .interact_text()
                .map_err(prompt_err)?;
            set_key(&mut profile, "gateway", gateway)?;

            let interval: String = Input::new()
                .with_prompt("Poll interval")
                .default(cfg.defaults.poll_interval.clone())
                .interact_text()
                .map_err(prompt_err)?;
            if interval != cfg.defaults.poll_interval {
                set_key(&mut profile, "poll_interval", interval)?;
            }

            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            let path = config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: ruuvictl tags list");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let table = format_config(&cfg)?;
            let out =
                output::render_single(&global.output, &cfg, |_| table.clone(), |_| "config".into())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_key(profile, &key, value)?;
            config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: ruuvictl config init");
            } else {
                for (name, profile) in &cfg.profiles {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}\t{}", profile.gateway);
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }
    }
}
