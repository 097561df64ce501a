//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use ruuvictl_config::ConfigError;
use ruuvictl_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const PARTIAL: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the gateway: {message}")]
    #[diagnostic(
        code(ruuvictl::connection_failed),
        help(
            "Check that the gateway is powered and reachable.\n\
             Try: ruuvictl tags list --gateway http://<gateway-ip>"
        )
    )]
    ConnectionFailed { message: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(ruuvictl::timeout),
        help("Increase timeout with --timeout or check the gateway's network link.")
    )]
    Timeout,

    // ── Gateway answers ──────────────────────────────────────────────
    #[error("Gateway error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    #[diagnostic(code(ruuvictl::gateway_error))]
    Gateway { status: Option<u16>, message: String },

    #[error("The gateway rejected the change: {message}")]
    #[diagnostic(code(ruuvictl::rejected))]
    Rejected { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(ruuvictl::partial_save),
        help("Run: ruuvictl tags show {mac} to see what the gateway now holds")
    )]
    PartialSave { mac: String, message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(ruuvictl::not_found),
        help("Run: ruuvictl {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("The Matter bridge is not enabled")]
    #[diagnostic(
        code(ruuvictl::bridge_disabled),
        help("Enable it with: ruuvictl sinks enable matter --apply")
    )]
    BridgeDisabled,

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ruuvictl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ruuvictl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: ruuvictl config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No gateway configured")]
    #[diagnostic(
        code(ruuvictl::no_config),
        help(
            "Create a profile with: ruuvictl config init\n\
             Or pass --gateway / set RUUVICTL_GATEWAY.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(ruuvictl::config))]
    Config(#[from] ConfigError),

    #[error("{message}")]
    #[diagnostic(code(ruuvictl::internal))]
    Internal { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(ruuvictl::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotFound { .. } | Self::BridgeDisabled => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::PartialSave { .. } => exit_code::PARTIAL,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Transport {
                status: None,
                message,
            } if message.contains("timed out") => CliError::Timeout,

            CoreError::Transport {
                status: None,
                message,
            } if message.starts_with("cannot connect") => CliError::ConnectionFailed { message },

            CoreError::Transport { status, message } => CliError::Gateway { status, message },

            CoreError::Rejected { message } => CliError::Rejected { message },

            partial @ CoreError::PartialMutation { .. } => CliError::PartialSave {
                mac: String::new(),
                message: partial.to_string(),
            },

            CoreError::UnknownDevice { mac } => CliError::NotFound {
                resource_type: "tag".into(),
                identifier: mac,
                list_command: "tags list".into(),
            },

            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "gateway".into(),
                reason: message,
            },

            other @ (CoreError::NotReady { .. }
            | CoreError::EditInProgress
            | CoreError::NoEditSession) => CliError::Internal {
                message: other.to_string(),
            },
        }
    }
}

/// Convert a core error, naming the tag a partial save refers to.
pub fn for_tag(mac: &str) -> impl Fn(CoreError) -> CliError + '_ {
    move |err| match CliError::from(err) {
        CliError::PartialSave { message, .. } => CliError::PartialSave {
            mac: mac.to_owned(),
            message,
        },
        other => other,
    }
}
