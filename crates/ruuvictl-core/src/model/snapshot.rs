// ── Sensor snapshot domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::mac::MacAddress;

/// Age below which a reading counts as live.
pub const LIVE_WINDOW_SECS: i64 = 60;

/// The latest reading for one discovered tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub mac: MacAddress,
    pub rssi: i64,
    pub data_format: i64,
    pub measurements: Measurements,
    pub last_seen: DateTime<Utc>,
}

/// Sparse measurement set. Which fields are present depends on the
/// tag's data format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_voltage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_power: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movement_counter: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_sequence_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pm1p0: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pm2p5: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pm4p0: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pm10p0: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nox: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub illuminance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_instant: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_peak: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_quality_index: Option<f64>,
}

impl Measurements {
    /// True if the tag reports particulate or gas readings (air-quality formats).
    pub fn has_air_quality(&self) -> bool {
        self.pm2p5.is_some() || self.co2.is_some() || self.voc.is_some() || self.nox.is_some()
    }
}

/// Advisory staleness of a reading. Never used to hide data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Freshness {
    /// Heard within the last minute.
    Live,
    /// Older than a minute but still listed by the gateway.
    Aging,
    /// No longer listed by the gateway; the last known reading is kept.
    StaleButShown,
}

/// Classify a reading by its age relative to `now`.
///
/// A timestamp in the future (gateway clock ahead of ours) counts as live.
pub fn classify_freshness(snapshot: &DeviceSnapshot, now: DateTime<Utc>) -> Freshness {
    if now.signed_duration_since(snapshot.last_seen).num_seconds() < LIVE_WINDOW_SECS {
        Freshness::Live
    } else {
        Freshness::Aging
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn snapshot_seen(at: DateTime<Utc>) -> DeviceSnapshot {
        DeviceSnapshot {
            mac: MacAddress::new("AA:BB:CC:DD:EE:FF"),
            rssi: -70,
            data_format: 5,
            measurements: Measurements::default(),
            last_seen: at,
        }
    }

    #[test]
    fn thirty_seconds_is_live() {
        let now = Utc::now();
        let snap = snapshot_seen(now - Duration::seconds(30));
        assert_eq!(classify_freshness(&snap, now), Freshness::Live);
    }

    #[test]
    fn ninety_seconds_is_aging() {
        let now = Utc::now();
        let snap = snapshot_seen(now - Duration::seconds(90));
        assert_eq!(classify_freshness(&snap, now), Freshness::Aging);
    }

    #[test]
    fn boundary_is_aging() {
        let now = Utc::now();
        let snap = snapshot_seen(now - Duration::seconds(LIVE_WINDOW_SECS));
        assert_eq!(classify_freshness(&snap, now), Freshness::Aging);
    }

    #[test]
    fn future_timestamp_is_live() {
        let now = Utc::now();
        let snap = snapshot_seen(now + Duration::seconds(5));
        assert_eq!(classify_freshness(&snap, now), Freshness::Live);
    }

    #[test]
    fn freshness_names() {
        assert_eq!(Freshness::StaleButShown.to_string(), "stale-but-shown");
    }
}
