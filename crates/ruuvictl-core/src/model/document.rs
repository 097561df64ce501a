// ── Configuration document helpers ──
//
// Section-level reads and copy-on-write updates of `GatewayConfig`.
// Each `with_*` destructures the whole document so that a new top-level
// field is a compile error here until it is carried over explicitly.

use indexmap::IndexMap;

use ruuvictl_api::GatewayConfig;

use super::mac::MacAddress;
use super::sink::{SinkConfig, SinkId};

/// Read and copy-on-write access to a gateway configuration document.
pub trait ConfigDocument {
    /// The section for `id`, if the document has one.
    fn sink(&self, id: SinkId) -> Option<SinkConfig>;

    /// Every sink slot in display order, present or not.
    fn sinks(&self) -> Vec<(SinkId, Option<SinkConfig>)>;

    /// A copy with the section matching `sink` replaced. Nothing else changes.
    fn with_sink(&self, sink: SinkConfig) -> GatewayConfig;

    /// A copy with `enabled_tags` replaced wholesale.
    fn with_enabled_tags(&self, tags: Vec<String>) -> GatewayConfig;

    /// A copy with `tag_names` replaced wholesale.
    fn with_tag_names(&self, names: IndexMap<String, String>) -> GatewayConfig;

    /// Case-insensitive membership in `enabled_tags`.
    fn lists_enabled(&self, mac: &MacAddress) -> bool;

    /// Case-insensitive lookup in `tag_names`.
    fn name_for(&self, mac: &MacAddress) -> Option<&str>;
}

impl ConfigDocument for GatewayConfig {
    fn sink(&self, id: SinkId) -> Option<SinkConfig> {
        match id {
            SinkId::Mqtt => self.mqtt_publisher.clone().map(SinkConfig::Mqtt),
            SinkId::InfluxDb => self.influxdb_publisher.clone().map(SinkConfig::InfluxDb),
            SinkId::InfluxDb3 => self.influxdb3_publisher.clone().map(SinkConfig::InfluxDb3),
            SinkId::Prometheus => self.prometheus.clone().map(SinkConfig::Prometheus),
            SinkId::Matter => self.matter.clone().map(SinkConfig::Matter),
        }
    }

    fn sinks(&self) -> Vec<(SinkId, Option<SinkConfig>)> {
        SinkId::all().map(|id| (id, self.sink(id))).collect()
    }

    fn with_sink(&self, sink: SinkConfig) -> GatewayConfig {
        let GatewayConfig {
            gw_mac,
            all_advertisements,
            hci_index,
            use_mock,
            mut mqtt_publisher,
            mut influxdb_publisher,
            mut influxdb3_publisher,
            mut prometheus,
            mut matter,
            enabled_tags,
            tag_names,
            extra,
        } = self.clone();

        match sink {
            SinkConfig::Mqtt(c) => mqtt_publisher = Some(c),
            SinkConfig::InfluxDb(c) => influxdb_publisher = Some(c),
            SinkConfig::InfluxDb3(c) => influxdb3_publisher = Some(c),
            SinkConfig::Prometheus(c) => prometheus = Some(c),
            SinkConfig::Matter(c) => matter = Some(c),
        }

        GatewayConfig {
            gw_mac,
            all_advertisements,
            hci_index,
            use_mock,
            mqtt_publisher,
            influxdb_publisher,
            influxdb3_publisher,
            prometheus,
            matter,
            enabled_tags,
            tag_names,
            extra,
        }
    }

    fn with_enabled_tags(&self, tags: Vec<String>) -> GatewayConfig {
        let GatewayConfig {
            gw_mac,
            all_advertisements,
            hci_index,
            use_mock,
            mqtt_publisher,
            influxdb_publisher,
            influxdb3_publisher,
            prometheus,
            matter,
            enabled_tags: _,
            tag_names,
            extra,
        } = self.clone();

        GatewayConfig {
            gw_mac,
            all_advertisements,
            hci_index,
            use_mock,
            mqtt_publisher,
            influxdb_publisher,
            influxdb3_publisher,
            prometheus,
            matter,
            enabled_tags: Some(tags),
            tag_names,
            extra,
        }
    }

    fn with_tag_names(&self, names: IndexMap<String, String>) -> GatewayConfig {
        let GatewayConfig {
            gw_mac,
            all_advertisements,
            hci_index,
            use_mock,
            mqtt_publisher,
            influxdb_publisher,
            influxdb3_publisher,
            prometheus,
            matter,
            enabled_tags,
            tag_names: _,
            extra,
        } = self.clone();

        GatewayConfig {
            gw_mac,
            all_advertisements,
            hci_index,
            use_mock,
            mqtt_publisher,
            influxdb_publisher,
            influxdb3_publisher,
            prometheus,
            matter,
            enabled_tags,
            tag_names: Some(names),
            extra,
        }
    }

    fn lists_enabled(&self, mac: &MacAddress) -> bool {
        self.enabled_tags
            .as_ref()
            .is_some_and(|tags| tags.iter().any(|t| mac.matches(t)))
    }

    fn name_for(&self, mac: &MacAddress) -> Option<&str> {
        self.tag_names.as_ref().and_then(|names| {
            names
                .iter()
                .find(|(k, _)| mac.matches(k))
                .map(|(_, v)| v.as_str())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ruuvictl_api::{InfluxDbPublisherConfig, MqttPublisherConfig};
    use serde_json::json;

    fn three_sink_document() -> GatewayConfig {
        serde_json::from_value(json!({
            "gw_mac": "00:11:22:33:44:55",
            "all_advertisements": true,
            "hci_index": 1,
            "use_mock": false,
            "mqtt_listener": { "enabled": false },
            "mqtt_publisher": { "enabled": true, "broker_url": "tcp://a:1883", "qos": 1 },
            "influxdb_publisher": { "enabled": false, "bucket": "b" },
            "prometheus": { "Enabled": true, "Port": 2112 },
            "enabled_tags": ["AA:BB:CC:DD:EE:FF"],
            "tag_names": { "AA:BB:CC:DD:EE:FF": "Sauna" }
        }))
        .unwrap()
    }

    #[test]
    fn with_sink_touches_only_that_section() {
        let before = three_sink_document();
        let replacement = SinkConfig::InfluxDb(InfluxDbPublisherConfig {
            enabled: Some(true),
            bucket: Some("c".into()),
            ..InfluxDbPublisherConfig::default()
        });

        let after = before.with_sink(replacement.clone());

        assert_eq!(after.sink(SinkId::InfluxDb), Some(replacement));
        assert_eq!(after.mqtt_publisher, before.mqtt_publisher);
        assert_eq!(after.prometheus, before.prometheus);
        assert_eq!(after.enabled_tags, before.enabled_tags);
        assert_eq!(after.tag_names, before.tag_names);
        assert_eq!(after.extra, before.extra);

        let mut expected = serde_json::to_value(&before).unwrap();
        expected["influxdb_publisher"] = json!({ "enabled": true, "bucket": "c" });
        assert_eq!(serde_json::to_value(&after).unwrap(), expected);
    }

    #[test]
    fn with_sink_adds_a_missing_section() {
        let before = three_sink_document();
        assert!(before.sink(SinkId::Matter).is_none());

        let after = before.with_sink(SinkConfig::default_for(SinkId::Matter));
        assert!(after.sink(SinkId::Matter).unwrap().is_enabled());
        assert_eq!(after.mqtt_publisher, before.mqtt_publisher);
    }

    #[test]
    fn sinks_lists_every_slot_in_order() {
        let doc = three_sink_document();
        let present: Vec<(SinkId, bool)> = doc
            .sinks()
            .into_iter()
            .map(|(id, cfg)| (id, cfg.is_some()))
            .collect();
        assert_eq!(
            present,
            [
                (SinkId::Mqtt, true),
                (SinkId::InfluxDb, true),
                (SinkId::InfluxDb3, false),
                (SinkId::Prometheus, true),
                (SinkId::Matter, false),
            ]
        );
    }

    #[test]
    fn tag_collections_are_replaced_wholesale() {
        let doc = three_sink_document();
        let doc = doc.with_enabled_tags(vec!["11:22:33:44:55:66".into()]);
        assert!(!doc.lists_enabled(&MacAddress::new("AA:BB:CC:DD:EE:FF")));
        assert!(doc.lists_enabled(&MacAddress::new("11:22:33:44:55:66")));

        let doc = doc.with_tag_names(IndexMap::new());
        assert!(doc.name_for(&MacAddress::new("AA:BB:CC:DD:EE:FF")).is_none());
        assert!(doc.mqtt_publisher.is_some());
    }

    #[test]
    fn lookups_ignore_case() {
        let mut doc = three_sink_document();
        doc.tag_names = Some(IndexMap::from([(
            "aa:bb:cc:dd:ee:ff".to_owned(),
            "Porch".to_owned(),
        )]));
        let mac = MacAddress::new("AA:BB:CC:DD:EE:FF");
        assert_eq!(doc.name_for(&mac), Some("Porch"));
        assert!(doc.lists_enabled(&MacAddress::new("aa:bb:cc:dd:ee:ff")));
    }

    #[test]
    fn sections_keep_their_own_unknown_keys() {
        let doc = three_sink_document();
        let Some(SinkConfig::Mqtt(MqttPublisherConfig { extra, .. })) = doc.sink(SinkId::Mqtt)
        else {
            panic!("mqtt section missing");
        };
        assert_eq!(extra.get("qos"), Some(&json!(1)));
    }
}
