// ── Sink domain types ──
//
// A sink is a downstream destination for processed readings. The gateway
// document has one optional section per sink; `SinkConfig` wraps the wire
// struct for whichever section is being read or edited.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use ruuvictl_api::{
    InfluxDb3PublisherConfig, InfluxDbPublisherConfig, MatterConfig, MqttPublisherConfig,
    PrometheusConfig,
};

use crate::error::CoreError;

/// Identifier of one of the five sink sections, in display order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    Serialize,
    Deserialize,
)]
pub enum SinkId {
    #[strum(to_string = "mqtt_publisher", serialize = "mqtt")]
    #[serde(rename = "mqtt_publisher")]
    Mqtt,
    #[strum(to_string = "influxdb_publisher", serialize = "influxdb")]
    #[serde(rename = "influxdb_publisher")]
    InfluxDb,
    #[strum(to_string = "influxdb3_publisher", serialize = "influxdb3")]
    #[serde(rename = "influxdb3_publisher")]
    InfluxDb3,
    #[strum(to_string = "prometheus")]
    #[serde(rename = "prometheus")]
    Prometheus,
    #[strum(to_string = "matter")]
    #[serde(rename = "matter")]
    Matter,
}

impl SinkId {
    /// Human-readable name for lists and prompts.
    pub fn label(self) -> &'static str {
        match self {
            Self::Mqtt => "MQTT publisher",
            Self::InfluxDb => "InfluxDB v2",
            Self::InfluxDb3 => "InfluxDB v3",
            Self::Prometheus => "Prometheus",
            Self::Matter => "Matter bridge",
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// Parse a section key, rejecting anything that is not a known sink.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        raw.parse().map_err(|_| CoreError::Validation {
            message: format!(
                "unknown sink '{raw}' (expected one of: {})",
                Self::iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", ")
            ),
        })
    }
}

/// Configuration of one sink section.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkConfig {
    Mqtt(MqttPublisherConfig),
    InfluxDb(InfluxDbPublisherConfig),
    InfluxDb3(InfluxDb3PublisherConfig),
    Prometheus(PrometheusConfig),
    Matter(MatterConfig),
}

impl SinkConfig {
    pub fn id(&self) -> SinkId {
        match self {
            Self::Mqtt(_) => SinkId::Mqtt,
            Self::InfluxDb(_) => SinkId::InfluxDb,
            Self::InfluxDb3(_) => SinkId::InfluxDb3,
            Self::Prometheus(_) => SinkId::Prometheus,
            Self::Matter(_) => SinkId::Matter,
        }
    }

    /// A present section with no `enabled` key is started by the gateway.
    pub fn is_enabled(&self) -> bool {
        self.enabled_flag().unwrap_or(true)
    }

    fn enabled_flag(&self) -> Option<bool> {
        match self {
            Self::Mqtt(c) => c.enabled,
            Self::InfluxDb(c) => c.enabled,
            Self::InfluxDb3(c) => c.enabled,
            Self::Prometheus(c) => c.enabled,
            Self::Matter(c) => c.enabled,
        }
    }

    /// Set the `enabled` flag, filling defaults when switching on.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        match &mut self {
            Self::Mqtt(c) => c.enabled = Some(enabled),
            Self::InfluxDb(c) => c.enabled = Some(enabled),
            Self::InfluxDb3(c) => c.enabled = Some(enabled),
            Self::Prometheus(c) => c.enabled = Some(enabled),
            Self::Matter(c) => c.enabled = Some(enabled),
        }
        self.with_defaults()
    }

    /// An enabled section populated entirely with documented defaults.
    pub fn default_for(id: SinkId) -> Self {
        let empty = match id {
            SinkId::Mqtt => Self::Mqtt(MqttPublisherConfig::default()),
            SinkId::InfluxDb => Self::InfluxDb(InfluxDbPublisherConfig::default()),
            SinkId::InfluxDb3 => Self::InfluxDb3(InfluxDb3PublisherConfig::default()),
            SinkId::Prometheus => Self::Prometheus(PrometheusConfig::default()),
            SinkId::Matter => Self::Matter(MatterConfig::default()),
        };
        empty.with_enabled(true)
    }

    /// Fill absent fields of an enabled section with documented defaults.
    ///
    /// Disabled sections are returned untouched; present values are never
    /// overwritten, including empty strings.
    pub fn with_defaults(self) -> Self {
        if !self.is_enabled() {
            return self;
        }
        match self {
            Self::Mqtt(c) => Self::Mqtt(mqtt_defaults(c)),
            Self::InfluxDb(c) => Self::InfluxDb(influxdb_defaults(c)),
            Self::InfluxDb3(c) => Self::InfluxDb3(influxdb3_defaults(c)),
            Self::Prometheus(c) => Self::Prometheus(prometheus_defaults(c)),
            Self::Matter(c) => Self::Matter(matter_defaults(c)),
        }
    }

    /// Parsed `minimum_interval`, for sinks that have one.
    pub fn minimum_interval(&self) -> Option<Duration> {
        let raw = match self {
            Self::Mqtt(c) => c.minimum_interval.as_deref(),
            Self::InfluxDb(c) => c.minimum_interval.as_deref(),
            Self::InfluxDb3(c) => c.minimum_interval.as_deref(),
            Self::Prometheus(_) | Self::Matter(_) => None,
        }?;
        humantime::parse_duration(raw).ok()
    }

    /// Main connection target, for one-line summaries.
    pub fn endpoint(&self) -> Option<String> {
        match self {
            Self::Mqtt(c) => c.broker_url.clone().or_else(|| {
                c.broker_address
                    .as_ref()
                    .map(|a| format!("{a}:{}", c.broker_port.unwrap_or(1883)))
            }),
            Self::InfluxDb(c) => c.url.clone(),
            Self::InfluxDb3(c) => c.url.clone(),
            Self::Prometheus(c) => c.port.map(|p| format!(":{p}/metrics")),
            Self::Matter(c) => c.discriminator.map(|d| format!("discriminator {d}")),
        }
    }

    /// The section as it appears on the wire.
    pub fn to_value(&self) -> Result<Value, CoreError> {
        let value = match self {
            Self::Mqtt(c) => serde_json::to_value(c),
            Self::InfluxDb(c) => serde_json::to_value(c),
            Self::InfluxDb3(c) => serde_json::to_value(c),
            Self::Prometheus(c) => serde_json::to_value(c),
            Self::Matter(c) => serde_json::to_value(c),
        };
        value.map_err(|e| CoreError::Validation {
            message: format!("cannot encode {} section: {e}", self.id()),
        })
    }

    /// Decode a section of the given kind from its wire form.
    pub fn from_value(id: SinkId, value: Value) -> Result<Self, CoreError> {
        let decoded = match id {
            SinkId::Mqtt => serde_json::from_value(value).map(Self::Mqtt),
            SinkId::InfluxDb => serde_json::from_value(value).map(Self::InfluxDb),
            SinkId::InfluxDb3 => serde_json::from_value(value).map(Self::InfluxDb3),
            SinkId::Prometheus => serde_json::from_value(value).map(Self::Prometheus),
            SinkId::Matter => serde_json::from_value(value).map(Self::Matter),
        };
        decoded.map_err(|e| CoreError::Validation {
            message: format!("invalid {id} section: {e}"),
        })
    }

    /// Set one field from its textual form (`port=9100`, `broker_url=tcp://..`).
    ///
    /// The value is read as JSON when it parses as such, otherwise as a
    /// plain string. Keys the section does not define are rejected unless
    /// the gateway already sent them.
    pub fn with_field(&self, key: &str, raw: &str) -> Result<Self, CoreError> {
        let id = self.id();
        let Value::Object(mut map) = self.to_value()? else {
            return Err(CoreError::Validation {
                message: format!("{id} section is not an object"),
            });
        };

        let known_before = map.keys().any(|k| same_key(k, key));
        map.retain(|k, _| !same_key(k, key));

        let decode = |value: Value| {
            let mut map = map.clone();
            map.insert(key.to_owned(), value);
            Self::from_value(id, Value::Object(map))
        };
        // `client_id=1234` is a string field holding digits, not a number.
        let updated = match serde_json::from_str::<Value>(raw) {
            Ok(parsed) => decode(parsed).or_else(|_| decode(Value::String(raw.to_owned())))?,
            Err(_) => decode(Value::String(raw.to_owned()))?,
        };
        if !known_before && updated.extra().contains_key(key) {
            return Err(CoreError::Validation {
                message: format!("{id} has no field '{key}'"),
            });
        }
        Ok(updated)
    }

    fn extra(&self) -> &serde_json::Map<String, Value> {
        match self {
            Self::Mqtt(c) => &c.extra,
            Self::InfluxDb(c) => &c.extra,
            Self::InfluxDb3(c) => &c.extra,
            Self::Prometheus(c) => &c.extra,
            Self::Matter(c) => &c.extra,
        }
    }
}

/// Key comparison that treats `Port`, `port` and `measurement_metric_prefix` /
/// `MeasurementMetricPrefix` as the same field.
fn same_key(a: &str, b: &str) -> bool {
    let squash = |s: &str| -> String {
        s.chars()
            .filter(|c| *c != '_')
            .flat_map(char::to_lowercase)
            .collect()
    };
    squash(a) == squash(b)
}

fn or_str(value: Option<String>, default: &str) -> Option<String> {
    value.or_else(|| Some(default.to_owned()))
}

fn mqtt_defaults(c: MqttPublisherConfig) -> MqttPublisherConfig {
    MqttPublisherConfig {
        broker_url: if c.broker_url.is_none() && c.broker_address.is_none() {
            Some("tcp://localhost:1883".into())
        } else {
            c.broker_url
        },
        client_id: or_str(c.client_id, "ruuvi-bridge"),
        topic_prefix: or_str(c.topic_prefix, "ruuvi_measurements"),
        minimum_interval: or_str(c.minimum_interval, "1s"),
        username: or_str(c.username, ""),
        password: or_str(c.password, ""),
        homeassistant_discovery_prefix: or_str(c.homeassistant_discovery_prefix, "homeassistant"),
        retain_messages: c.retain_messages.or(Some(true)),
        ..c
    }
}

fn influxdb_defaults(c: InfluxDbPublisherConfig) -> InfluxDbPublisherConfig {
    InfluxDbPublisherConfig {
        url: or_str(c.url, "http://localhost:8086"),
        auth_token: or_str(c.auth_token, ""),
        org: or_str(c.org, "my-org"),
        bucket: or_str(c.bucket, "ruuvi"),
        measurement: or_str(c.measurement, "ruuvi_measurements"),
        minimum_interval: or_str(c.minimum_interval, "1s"),
        ..c
    }
}

fn influxdb3_defaults(c: InfluxDb3PublisherConfig) -> InfluxDb3PublisherConfig {
    InfluxDb3PublisherConfig {
        url: or_str(c.url, "http://localhost:8181"),
        auth_token: or_str(c.auth_token, ""),
        database: or_str(c.database, "ruuvi"),
        measurement: or_str(c.measurement, "ruuvi_measurements"),
        minimum_interval: or_str(c.minimum_interval, "1s"),
        ..c
    }
}

fn prometheus_defaults(c: PrometheusConfig) -> PrometheusConfig {
    PrometheusConfig {
        port: c.port.or(Some(2112)),
        measurement_metric_prefix: or_str(c.measurement_metric_prefix, "ruuvi_"),
        ..c
    }
}

fn matter_defaults(c: MatterConfig) -> MatterConfig {
    MatterConfig {
        passcode: c.passcode.or(Some(20_202_021)),
        discriminator: c.discriminator.or(Some(3840)),
        vendor_id: c.vendor_id.or(Some(0xFFF1)),
        product_id: c.product_id.or(Some(0x8000)),
        storage_path: or_str(c.storage_path, "matter-storage"),
        ..c
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn sink_ids_parse_from_section_keys_and_short_names() {
        assert_eq!(SinkId::parse("mqtt_publisher").unwrap(), SinkId::Mqtt);
        assert_eq!(SinkId::parse("influxdb3").unwrap(), SinkId::InfluxDb3);
        assert_eq!(SinkId::Matter.to_string(), "matter");
        assert!(matches!(
            SinkId::parse("http_listener"),
            Err(CoreError::Validation { .. })
        ));
    }

    #[test]
    fn sink_order_is_fixed() {
        let order: Vec<String> = SinkId::all().map(|s| s.to_string()).collect();
        assert_eq!(
            order,
            [
                "mqtt_publisher",
                "influxdb_publisher",
                "influxdb3_publisher",
                "prometheus",
                "matter"
            ]
        );
    }

    #[test]
    fn absent_enabled_means_enabled() {
        let sink = SinkConfig::Prometheus(PrometheusConfig::default());
        assert!(sink.is_enabled());
        assert!(!sink.with_enabled(false).is_enabled());
    }

    #[test]
    fn toggling_on_fills_every_default() {
        let sink = SinkConfig::Mqtt(MqttPublisherConfig {
            enabled: Some(false),
            broker_url: Some("tcp://x:1883".into()),
            ..MqttPublisherConfig::default()
        })
        .with_enabled(true);

        let SinkConfig::Mqtt(c) = sink else {
            panic!("variant changed");
        };
        assert_eq!(c.enabled, Some(true));
        assert_eq!(c.broker_url.as_deref(), Some("tcp://x:1883"));
        assert_eq!(c.client_id.as_deref(), Some("ruuvi-bridge"));
        assert_eq!(c.topic_prefix.as_deref(), Some("ruuvi_measurements"));
        assert_eq!(c.minimum_interval.as_deref(), Some("1s"));
        assert_eq!(c.homeassistant_discovery_prefix.as_deref(), Some("homeassistant"));
        assert_eq!(c.retain_messages, Some(true));
    }

    #[test]
    fn disabled_section_is_not_padded() {
        let sink = SinkConfig::InfluxDb(InfluxDbPublisherConfig {
            enabled: Some(false),
            ..InfluxDbPublisherConfig::default()
        })
        .with_defaults();
        assert_eq!(sink.to_value().unwrap(), json!({ "enabled": false }));
    }

    #[test]
    fn matter_defaults_use_test_vendor() {
        let SinkConfig::Matter(c) = SinkConfig::default_for(SinkId::Matter) else {
            panic!("wrong variant");
        };
        assert_eq!(c.passcode, Some(20_202_021));
        assert_eq!(c.discriminator, Some(3840));
        assert_eq!(c.vendor_id, Some(65521));
        assert_eq!(c.product_id, Some(32768));
    }

    #[test]
    fn minimum_interval_parses_go_durations() {
        let sink = SinkConfig::default_for(SinkId::InfluxDb3);
        assert_eq!(sink.minimum_interval(), Some(Duration::from_secs(1)));
        assert_eq!(SinkConfig::default_for(SinkId::Matter).minimum_interval(), None);
    }

    #[test]
    fn with_field_sets_typed_values() {
        let sink = SinkConfig::default_for(SinkId::Prometheus)
            .with_field("port", "9100")
            .unwrap();
        let SinkConfig::Prometheus(c) = &sink else {
            panic!("wrong variant");
        };
        assert_eq!(c.port, Some(9100));
        assert!(c.extra.is_empty());

        let sink = sink.with_field("measurement_metric_prefix", "env_").unwrap();
        assert_eq!(
            sink.to_value().unwrap(),
            json!({ "Enabled": true, "Port": 9100, "MeasurementMetricPrefix": "env_" })
        );
    }

    #[test]
    fn with_field_rejects_unknown_keys_and_bad_types() {
        let sink = SinkConfig::default_for(SinkId::Mqtt);
        assert!(matches!(
            sink.with_field("brokr_url", "tcp://x"),
            Err(CoreError::Validation { .. })
        ));
        assert!(matches!(
            sink.with_field("retain_messages", "\"yes\""),
            Err(CoreError::Validation { .. })
        ));
    }

    #[test]
    fn with_field_keeps_numeric_looking_strings() {
        let sink = SinkConfig::default_for(SinkId::Mqtt)
            .with_field("client_id", "1234")
            .unwrap();
        assert_eq!(sink.to_value().unwrap()["client_id"], json!("1234"));
    }

    #[test]
    fn with_field_keeps_fields_the_gateway_sent() {
        let sink = SinkConfig::from_value(
            SinkId::Mqtt,
            json!({ "enabled": true, "qos": 1 }),
        )
        .unwrap();
        let updated = sink.with_field("qos", "2").unwrap();
        assert_eq!(updated.to_value().unwrap()["qos"], json!(2));
    }
}
