// Wire types for the gateway management API.
//
// Every section field is optional so that a document fetched from the
// gateway serializes back without inventing or dropping keys. Keys this
// client does not model are kept in the flattened `extra` maps.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Configuration document ───────────────────────────────────────────

/// The full gateway configuration as served by `GET /api/config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub gw_mac: String,
    #[serde(default)]
    pub all_advertisements: bool,
    #[serde(default)]
    pub hci_index: i64,
    #[serde(default)]
    pub use_mock: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mqtt_publisher: Option<MqttPublisherConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub influxdb_publisher: Option<InfluxDbPublisherConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub influxdb3_publisher: Option<InfluxDb3PublisherConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prometheus: Option<PrometheusConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matter: Option<MatterConfig>,

    /// Allowlist of device MACs forwarded to the sinks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_tags: Option<Vec<String>>,
    /// Operator-assigned display names keyed by device MAC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_names: Option<IndexMap<String, String>>,

    /// Listener, processing, logging and other sections, carried verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// MQTT publisher section (`mqtt_publisher`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MqttPublisherConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_raw: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retain_messages: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homeassistant_discovery_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lwt_topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lwt_online_payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lwt_offline_payload: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// InfluxDB v2 publisher section (`influxdb_publisher`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfluxDbPublisherConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_tags: Option<IndexMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// InfluxDB v3 publisher section (`influxdb3_publisher`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfluxDb3PublisherConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_tags: Option<IndexMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Prometheus exposition section (`prometheus`).
///
/// The gateway encodes this section with its Go field names and decodes
/// JSON keys case-insensitively, so the PascalCase names are written back
/// and snake_case is accepted on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrometheusConfig {
    #[serde(
        rename = "Enabled",
        alias = "enabled",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub enabled: Option<bool>,
    #[serde(
        rename = "Port",
        alias = "port",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub port: Option<u16>,
    #[serde(
        rename = "MeasurementMetricPrefix",
        alias = "measurement_metric_prefix",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub measurement_metric_prefix: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Matter bridge section (`matter`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passcode: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Tag readings ─────────────────────────────────────────────────────

/// One discovered sensor as served by `GET /api/tags`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagRecord {
    pub mac: String,
    #[serde(default)]
    pub rssi: i64,
    #[serde(default)]
    pub data_format: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_voltage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_power: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement_counter: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_sequence_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm1p0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm2p5: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm4p0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm10p0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nox: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub illuminance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound_instant: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound_peak: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_quality_index: Option<f64>,
    /// Unix timestamp of the last advertisement.
    #[serde(default)]
    pub last_seen: i64,
}

// ── Requests ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct TagEnableRequest<'a> {
    pub mac: &'a str,
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct TagNameRequest<'a> {
    pub mac: &'a str,
    pub name: &'a str,
}

// ── Responses ────────────────────────────────────────────────────────

/// Answer to `POST /api/tags/enable`: the complete allowlist after the update.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TagEnableResponse {
    pub success: bool,
    pub enabled_tags: Vec<String>,
}

/// Answer to `POST /api/tags/name`: the complete name map after the update.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TagNameResponse {
    pub success: bool,
    pub tag_names: IndexMap<String, String>,
}

/// Matter commissioning information from `GET /api/matter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatterStatus {
    pub pairing_code: String,
    #[serde(alias = "qr_code")]
    pub qr_payload: String,
}

/// Answer to `POST /api/restart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RestartResponse {
    pub restarting: bool,
}
