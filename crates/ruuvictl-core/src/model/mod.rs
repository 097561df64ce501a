// Domain model for the gateway control panel.

pub mod document;
pub mod mac;
pub mod sink;
pub mod snapshot;

pub use document::ConfigDocument;
pub use mac::MacAddress;
pub use sink::{SinkConfig, SinkId};
pub use snapshot::{DeviceSnapshot, Freshness, LIVE_WINDOW_SECS, Measurements, classify_freshness};
