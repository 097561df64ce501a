//! Client-side state layer between `ruuvictl-api` and the CLI.
//!
//! Keeps a local view of a Ruuvi gateway consistent with the gateway
//! itself and turns operator edits into server updates:
//!
//! - **[`Controller`]**: Lifecycle of one panel:
//!   [`load()`](Controller::load) fetches configuration and readings
//!   concurrently into a fresh [`Session`], a cancellable task polls
//!   readings, edits go through one open [`EditSession`] at a time, and
//!   [`confirm_restart()`](Controller::confirm_restart) restarts the
//!   gateway and reloads from scratch.
//!
//! - **[`ConfigStore`]**: The latest full configuration document. Sink
//!   edits are merged into a copy, pushed whole, and swapped in only on
//!   success.
//!
//! - **[`SnapshotCache`]**: Latest reading per tag (`DashMap` +
//!   `tokio::sync::watch`), sorted by MAC, with stale entries retained.
//!
//! - **[`TagLedger`]**: Tag membership and names, written back wholesale
//!   from the gateway's answers.

pub mod config;
pub mod controller;
pub mod convert;
pub mod edit;
pub mod error;
pub mod ledger;
pub mod model;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{PanelConfig, SnapshotRetention, TlsVerification};
pub use controller::{Controller, PanelState};
pub use edit::{CommitOutcome, EditSession, SinkDraft, TagDraft};
pub use error::{CoreError, TagField};
pub use ledger::{TagEdit, TagLedger};
pub use session::Session;
pub use store::{CachedSnapshot, ConfigStore, RestartFlag, SnapshotCache, SnapshotList};

pub use model::{
    ConfigDocument, DeviceSnapshot, Freshness, MacAddress, Measurements, SinkConfig, SinkId,
    classify_freshness,
};

// Wire types that appear in this crate's public API.
pub use ruuvictl_api::{GatewayConfig, MatterStatus};
