// ── Wire-to-domain conversions ──

use chrono::{DateTime, Utc};

use ruuvictl_api::TagRecord;

use crate::model::{DeviceSnapshot, MacAddress, Measurements};

/// Timestamps above this cannot be seconds (year 5138) and are read as milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Interpret a gateway `last_seen` value.
///
/// The gateway stamps tags with millisecond precision while older builds
/// used seconds; both are accepted. Out-of-range values map to the epoch.
pub fn last_seen_to_utc(raw: i64) -> DateTime<Utc> {
    let parsed = if raw > MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(raw)
    } else {
        DateTime::from_timestamp(raw, 0)
    };
    parsed.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

impl From<TagRecord> for DeviceSnapshot {
    fn from(t: TagRecord) -> Self {
        Self {
            mac: MacAddress::new(&t.mac),
            rssi: t.rssi,
            data_format: t.data_format,
            last_seen: last_seen_to_utc(t.last_seen),
            measurements: Measurements {
                temperature: t.temperature,
                humidity: t.humidity,
                pressure: t.pressure,
                battery_voltage: t.battery_voltage,
                tx_power: t.tx_power,
                movement_counter: t.movement_counter,
                measurement_sequence_number: t.measurement_sequence_number,
                pm1p0: t.pm1p0,
                pm2p5: t.pm2p5,
                pm4p0: t.pm4p0,
                pm10p0: t.pm10p0,
                co2: t.co2,
                voc: t.voc,
                nox: t.nox,
                illuminance: t.illuminance,
                sound_instant: t.sound_instant,
                sound_average: t.sound_average,
                sound_peak: t.sound_peak,
                air_quality_index: t.air_quality_index,
            },
        }
    }
}
