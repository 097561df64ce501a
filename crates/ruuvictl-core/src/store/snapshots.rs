// ── Sensor snapshot cache ──
//
// Concurrent storage of the latest reading per tag, with push-based
// change notification via a `watch` channel carrying the sorted list.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::debug;

use ruuvictl_api::GatewayClient;

use crate::config::SnapshotRetention;
use crate::error::CoreError;
use crate::model::{DeviceSnapshot, Freshness, MacAddress, classify_freshness};

/// A cached reading and how many polls in a row have not listed it.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSnapshot {
    pub snapshot: DeviceSnapshot,
    pub missed_polls: u32,
}

impl CachedSnapshot {
    /// Whether the latest poll left this tag out.
    pub fn is_stale(&self) -> bool {
        self.missed_polls > 0
    }

    pub fn freshness(&self, now: DateTime<Utc>) -> Freshness {
        if self.is_stale() {
            Freshness::StaleButShown
        } else {
            classify_freshness(&self.snapshot, now)
        }
    }
}

pub type SnapshotList = Arc<Vec<Arc<CachedSnapshot>>>;

/// Latest reading per tag, keyed by normalized MAC.
///
/// Every tag a poll lists replaces its entry wholesale. A tag the poll
/// leaves out keeps its last reading and is marked stale; with a
/// `missed_poll_limit` it is dropped after that many consecutive misses.
pub struct SnapshotCache {
    entries: DashMap<MacAddress, Arc<CachedSnapshot>>,
    snapshot: watch::Sender<SnapshotList>,
    retention: SnapshotRetention,
}

impl SnapshotCache {
    pub fn new(retention: SnapshotRetention) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            entries: DashMap::new(),
            snapshot,
            retention,
        }
    }

    /// Fetch the current tag set from the gateway and apply it.
    ///
    /// On failure the cache is left exactly as it was.
    pub async fn refresh(&self, client: &GatewayClient) -> Result<usize, CoreError> {
        let records = client.list_tags().await?;
        let count = records.len();
        self.apply(records.into_iter().map(DeviceSnapshot::from));
        debug!(tags = count, cached = self.len(), "snapshot cache refreshed");
        Ok(count)
    }

    /// Apply one complete poll response.
    pub fn apply(&self, polled: impl IntoIterator<Item = DeviceSnapshot>) {
        let mut seen = Vec::new();
        for snapshot in polled {
            seen.push(snapshot.mac.clone());
            self.entries.insert(
                snapshot.mac.clone(),
                Arc::new(CachedSnapshot {
                    snapshot,
                    missed_polls: 0,
                }),
            );
        }

        let absent: Vec<MacAddress> = self
            .entries
            .iter()
            .filter(|e| !seen.contains(e.key()))
            .map(|e| e.key().clone())
            .collect();

        for mac in absent {
            let Some(prev) = self.entries.get(&mac).map(|e| Arc::clone(e.value())) else {
                continue;
            };
            let missed = prev.missed_polls.saturating_add(1);
            if self
                .retention
                .missed_poll_limit
                .is_some_and(|limit| missed >= limit)
            {
                debug!(%mac, missed, "dropping tag absent from recent polls");
                self.entries.remove(&mac);
            } else {
                self.entries.insert(
                    mac,
                    Arc::new(CachedSnapshot {
                        snapshot: prev.snapshot.clone(),
                        missed_polls: missed,
                    }),
                );
            }
        }

        self.rebuild_snapshot();
    }

    /// Latest reading for `mac`, in any case or separator style.
    pub fn get(&self, mac: &MacAddress) -> Option<Arc<CachedSnapshot>> {
        self.entries.get(mac).map(|r| Arc::clone(r.value()))
    }

    /// All entries, ascending by MAC.
    pub fn sorted(&self) -> SnapshotList {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to the sorted list; a new value is sent after every poll.
    pub fn subscribe(&self) -> watch::Receiver<SnapshotList> {
        self.snapshot.subscribe()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn rebuild_snapshot(&self) {
        let mut values: Vec<Arc<CachedSnapshot>> =
            self.entries.iter().map(|r| Arc::clone(r.value())).collect();
        values.sort_by(|a, b| a.snapshot.mac.cmp(&b.snapshot.mac));
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Measurements;
    use chrono::Duration;

    fn reading(mac: &str, temperature: f64, age_secs: i64) -> DeviceSnapshot {
        DeviceSnapshot {
            mac: MacAddress::new(mac),
            rssi: -60,
            data_format: 5,
            measurements: Measurements {
                temperature: Some(temperature),
                ..Measurements::default()
            },
            last_seen: Utc::now() - Duration::seconds(age_secs),
        }
    }

    fn retain_forever() -> SnapshotCache {
        SnapshotCache::new(SnapshotRetention::default())
    }

    #[test]
    fn listed_tags_replace_their_entry() {
        let cache = retain_forever();
        cache.apply([reading("AA:BB:CC:DD:EE:FF", 20.0, 1)]);
        cache.apply([reading("AA:BB:CC:DD:EE:FF", 21.5, 0)]);

        let entry = cache.get(&MacAddress::new("aa:bb:cc:dd:ee:ff")).unwrap();
        assert_eq!(entry.snapshot.measurements.temperature, Some(21.5));
        assert_eq!(entry.missed_polls, 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn absent_tags_are_kept_stale() {
        let cache = retain_forever();
        cache.apply([
            reading("AA:00:00:00:00:01", 20.0, 1),
            reading("AA:00:00:00:00:02", 18.0, 1),
        ]);
        cache.apply([reading("AA:00:00:00:00:01", 20.5, 0)]);
        cache.apply([reading("AA:00:00:00:00:01", 20.7, 0)]);

        let gone = cache.get(&MacAddress::new("AA:00:00:00:00:02")).unwrap();
        assert_eq!(gone.missed_polls, 2);
        assert_eq!(gone.snapshot.measurements.temperature, Some(18.0));
        assert_eq!(gone.freshness(Utc::now()), Freshness::StaleButShown);
    }

    #[test]
    fn reappearing_tag_is_fresh_again() {
        let cache = retain_forever();
        cache.apply([reading("AA:00:00:00:00:02", 18.0, 1)]);
        cache.apply([]);
        cache.apply([reading("AA:00:00:00:00:02", 19.0, 0)]);

        let back = cache.get(&MacAddress::new("AA:00:00:00:00:02")).unwrap();
        assert!(!back.is_stale());
        assert_eq!(back.freshness(Utc::now()), Freshness::Live);
    }

    #[test]
    fn missed_poll_limit_drops_entries() {
        let cache = SnapshotCache::new(SnapshotRetention {
            missed_poll_limit: Some(2),
        });
        cache.apply([reading("AA:00:00:00:00:02", 18.0, 1)]);
        cache.apply([]);
        assert!(cache.get(&MacAddress::new("AA:00:00:00:00:02")).is_some());
        cache.apply([]);
        assert!(cache.get(&MacAddress::new("AA:00:00:00:00:02")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn aging_reading_is_still_retrievable() {
        let cache = retain_forever();
        cache.apply([reading("AA:BB:CC:DD:EE:FF", 20.0, 90)]);

        let entry = cache.get(&MacAddress::new("AA:BB:CC:DD:EE:FF")).unwrap();
        assert_eq!(entry.freshness(Utc::now()), Freshness::Aging);
        assert_eq!(entry.snapshot.measurements.temperature, Some(20.0));
    }

    #[test]
    fn sorted_orders_by_mac() {
        let cache = retain_forever();
        cache.apply([
            reading("f0:00:00:00:00:01", 1.0, 0),
            reading("0a:00:00:00:00:01", 2.0, 0),
            reading("C1:00:00:00:00:01", 3.0, 0),
        ]);

        let order: Vec<String> = cache
            .sorted()
            .iter()
            .map(|e| e.snapshot.mac.to_string())
            .collect();
        assert_eq!(
            order,
            ["0A:00:00:00:00:01", "C1:00:00:00:00:01", "F0:00:00:00:00:01"]
        );
    }

    #[test]
    fn subscribers_see_each_poll() {
        let cache = retain_forever();
        let mut rx = cache.subscribe();
        assert!(rx.borrow_and_update().is_empty());

        cache.apply([reading("AA:BB:CC:DD:EE:FF", 20.0, 0)]);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
    }
}
