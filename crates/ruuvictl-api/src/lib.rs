// ruuvictl-api: Async Rust client for the Ruuvi gateway management API

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

mod config;
mod system;
mod tags;

pub use client::GatewayClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{
    GatewayConfig, InfluxDb3PublisherConfig, InfluxDbPublisherConfig, MatterConfig, MatterStatus,
    MqttPublisherConfig, PrometheusConfig, RestartResponse, TagEnableResponse, TagNameResponse,
    TagRecord,
};
