#![allow(clippy::unwrap_used)]
// Integration tests for `GatewayClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ruuvictl_api::{Error, GatewayClient, GatewayConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, GatewayClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = GatewayClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn sample_config() -> serde_json::Value {
    json!({
        "gw_mac": "AA:BB:CC:00:11:22",
        "all_advertisements": false,
        "hci_index": 0,
        "use_mock": false,
        "http_listener": { "enabled": true, "port": 8080 },
        "mqtt_publisher": {
            "enabled": true,
            "broker_url": "tcp://broker:1883",
            "client_id": "ruuvi-bridge",
            "topic_prefix": "ruuvi_measurements"
        },
        "prometheus": { "Enabled": false, "Port": 2112 },
        "enabled_tags": ["C1:2F:00:11:22:33"],
        "tag_names": { "C1:2F:00:11:22:33": "Kitchen" }
    })
}

// ── Configuration ───────────────────────────────────────────────────

#[tokio::test]
async fn test_get_config() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_config()))
        .mount(&server)
        .await;

    let config = client.get_config().await.unwrap();

    assert_eq!(config.gw_mac, "AA:BB:CC:00:11:22");
    let mqtt = config.mqtt_publisher.as_ref().unwrap();
    assert_eq!(mqtt.broker_url.as_deref(), Some("tcp://broker:1883"));
    assert_eq!(config.prometheus.as_ref().unwrap().enabled, Some(false));
    assert_eq!(
        config.enabled_tags.as_deref(),
        Some(&["C1:2F:00:11:22:33".to_owned()][..])
    );
    assert!(config.extra.contains_key("http_listener"));
}

#[tokio::test]
async fn test_replace_config_sends_full_document() {
    let (server, client) = setup().await;
    let config: GatewayConfig = serde_json::from_value(sample_config()).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/config"))
        .and(body_json(sample_config()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    client.replace_config(&config).await.unwrap();
}

#[tokio::test]
async fn test_replace_config_server_error() {
    let (server, client) = setup().await;
    let config: GatewayConfig = serde_json::from_value(sample_config()).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Failed to save config\n"))
        .mount(&server)
        .await;

    let err = client.replace_config(&config).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(
        matches!(err, Error::Api { ref message, .. } if message == "Failed to save config"),
        "unexpected error: {err:?}"
    );
}

// ── Tags ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_tags() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "mac": "C1:2F:00:11:22:33",
                "rssi": -71,
                "data_format": 5,
                "temperature": 21.5,
                "humidity": 40.25,
                "pressure": 1009.5,
                "battery_voltage": 2.9,
                "last_seen": 1_700_000_000
            },
            { "mac": "D4:00:00:00:00:01", "rssi": -90, "data_format": 6, "co2": 612.0, "last_seen": 1_700_000_010 }
        ])))
        .mount(&server)
        .await;

    let tags = client.list_tags().await.unwrap();

    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].rssi, -71);
    assert_eq!(tags[0].temperature, Some(21.5));
    assert_eq!(tags[1].co2, Some(612.0));
    assert!(tags[1].temperature.is_none());
}

#[tokio::test]
async fn test_set_tag_enabled() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/tags/enable"))
        .and(body_json(json!({ "mac": "c1:2f:00:11:22:33", "enabled": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "enabled_tags": ["C1:2F:00:11:22:33"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .set_tag_enabled("c1:2f:00:11:22:33", true)
        .await
        .unwrap();

    assert!(resp.success);
    assert_eq!(resp.enabled_tags, vec!["C1:2F:00:11:22:33"]);
}

#[tokio::test]
async fn test_set_tag_name() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/tags/name"))
        .and(body_json(json!({ "mac": "C1:2F:00:11:22:33", "name": "Sauna" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "tag_names": { "C1:2F:00:11:22:33": "Sauna" }
        })))
        .mount(&server)
        .await;

    let resp = client
        .set_tag_name("C1:2F:00:11:22:33", "Sauna")
        .await
        .unwrap();

    assert!(resp.success);
    assert_eq!(resp.tag_names.get("C1:2F:00:11:22:33").map(String::as_str), Some("Sauna"));
}

#[tokio::test]
async fn test_bad_request_is_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/tags/enable"))
        .respond_with(ResponseTemplate::new(400).set_body_string("MAC address required"))
        .mount(&server)
        .await;

    let err = client.set_tag_enabled("", true).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}

// ── System ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_matter_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/matter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pairing_code": "34970112332",
            "qr_code": "MT:Y.K9042C00KA0648G00"
        })))
        .mount(&server)
        .await;

    let status = client.matter_status().await.unwrap();

    assert_eq!(status.pairing_code, "34970112332");
    assert_eq!(status.qr_payload, "MT:Y.K9042C00KA0648G00");
}

#[tokio::test]
async fn test_matter_not_enabled() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/matter"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Matter not enabled"))
        .mount(&server)
        .await;

    let err = client.matter_status().await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_restart() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/restart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "restarting": true })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.restart().await.unwrap();
    assert!(resp.restarting);
}

// ── Decoding ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[{\"mac\": \"AA"))
        .mount(&server)
        .await;

    let err = client.list_tags().await.unwrap_err();

    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "[{\"mac\": \"AA"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_tag_answer_without_collection_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/tags/enable"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let err = client
        .set_tag_enabled("C1:2F:00:11:22:33", true)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }), "{err:?}");
}

#[tokio::test]
async fn test_unreachable_gateway() {
    // Nothing listens on a port we just released.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let base_url = Url::parse(&format!("http://127.0.0.1:{port}")).unwrap();

    let client = GatewayClient::with_client(reqwest::Client::new(), base_url);
    let err = client.get_config().await.unwrap_err();

    assert!(err.is_unreachable(), "expected connect failure, got: {err:?}");
}
