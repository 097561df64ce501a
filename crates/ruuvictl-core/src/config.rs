// ── Runtime panel configuration ──
//
// These types describe *how* to talk to a gateway and how the panel
// behaves between requests. They never touch disk: the CLI builds a
// `PanelConfig` from its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use ruuvictl_api::{TlsMode, TransportConfig};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed reverse proxy in front of the gateway).
    DangerAcceptInvalid,
}

/// What to do with a tag that stops appearing in poll responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotRetention {
    /// Drop the entry after this many consecutive polls without it.
    /// `None` keeps the last reading forever.
    pub missed_poll_limit: Option<u32>,
}

/// Configuration for one gateway panel.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Gateway URL (e.g., `http://ruuvi-gateway.local:8080`).
    pub url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Period of the snapshot poll.
    pub poll_interval: Duration,
    /// How long to wait after a restart before reloading.
    pub restart_grace: Duration,
    pub retention: SnapshotRetention,
}

impl PanelConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
    pub const DEFAULT_RESTART_GRACE: Duration = Duration::from_secs(2);

    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Self::DEFAULT_TIMEOUT,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            restart_grace: Self::DEFAULT_RESTART_GRACE,
            retention: SnapshotRetention::default(),
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}
