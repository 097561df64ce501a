// ── Core error types ──
//
// User-facing errors from ruuvictl-core. The `From<ruuvictl_api::Error>`
// impl folds every transport-layer failure into `Transport`, keeping the
// HTTP-equivalent status when the gateway answered at all.

use strum::Display;
use thiserror::Error;

use crate::controller::PanelState;

/// The half of a combined tag edit that a [`CoreError::PartialMutation`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum TagField {
    Name,
    Enabled,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Gateway communication ────────────────────────────────────────
    #[error("Gateway request failed{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Transport {
        /// HTTP status, absent when the gateway could not be reached.
        status: Option<u16>,
        message: String,
    },

    #[error("Gateway rejected the change: {message}")]
    Rejected { message: String },

    // ── Edits ────────────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Tag {failed} was not saved ({source}); tag {saved} was saved")]
    PartialMutation {
        saved: TagField,
        failed: TagField,
        #[source]
        source: Box<CoreError>,
    },

    #[error("Unknown device: {mac}")]
    UnknownDevice { mac: String },

    // ── Controller state ─────────────────────────────────────────────
    #[error("Panel is not ready (state: {state})")]
    NotReady { state: PanelState },

    #[error("Another edit is already open")]
    EditInProgress,

    #[error("No edit is open")]
    NoEditSession,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// HTTP status of a transport failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::PartialMutation { source, .. } => source.status(),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<ruuvictl_api::Error> for CoreError {
    fn from(err: ruuvictl_api::Error) -> Self {
        match err {
            ruuvictl_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid gateway URL: {e}"),
            },
            ruuvictl_api::Error::Tls(message) => CoreError::Config {
                message: format!("TLS setup failed: {message}"),
            },
            ruuvictl_api::Error::Api { status, message } => CoreError::Transport {
                status: Some(status),
                message,
            },
            ruuvictl_api::Error::Deserialization { message, .. } => CoreError::Transport {
                status: None,
                message: format!("unexpected response: {message}"),
            },
            ruuvictl_api::Error::Transport(ref e) => CoreError::Transport {
                status: e.status().map(|s| s.as_u16()),
                message: if e.is_timeout() {
                    "request timed out".into()
                } else if e.is_connect() {
                    format!(
                        "cannot connect to {}",
                        e.url().map_or_else(|| "<unknown>".into(), ToString::to_string)
                    )
                } else {
                    err.to_string()
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_status() {
        let err = CoreError::from(ruuvictl_api::Error::Api {
            status: 500,
            message: "Failed to save config".into(),
        });
        assert_eq!(err.status(), Some(500));
        assert_eq!(
            err.to_string(),
            "Gateway request failed (HTTP 500): Failed to save config"
        );
    }

    #[test]
    fn partial_mutation_names_both_halves() {
        let err = CoreError::PartialMutation {
            saved: TagField::Name,
            failed: TagField::Enabled,
            source: Box::new(CoreError::Transport {
                status: Some(502),
                message: "bad gateway".into(),
            }),
        };
        let text = err.to_string();
        assert!(text.contains("enabled was not saved"), "{text}");
        assert!(text.contains("name was saved"), "{text}");
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn bad_url_is_config_error() {
        let parse = url::Url::parse("::").expect_err("invalid");
        let err = CoreError::from(ruuvictl_api::Error::InvalidUrl(parse));
        assert!(matches!(err, CoreError::Config { .. }));
    }
}
