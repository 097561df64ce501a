//! CLI configuration: thin wrapper around `ruuvictl_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--gateway, --insecure, --timeout).

use ruuvictl_core::PanelConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use ruuvictl_config::{
    Config, Profile, config_path, load_config_or_default, profile_to_panel_config,
    save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names for error help.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Build a `PanelConfig` from the config file, profile, and CLI overrides.
///
/// Flags win over the profile. With no matching profile, `--gateway`
/// alone is enough.
pub fn resolve_panel_config(global: &GlobalOpts, cfg: &Config) -> Result<PanelConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let base = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(cfg),
            });
        }
        None => Profile::default(),
    };

    let profile = apply_overrides(base, global);
    if profile.gateway.is_empty() {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    }

    Ok(profile_to_panel_config(&profile, &cfg.defaults)?)
}

fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref gateway) = global.gateway {
        profile.gateway.clone_from(gateway);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    profile
}
