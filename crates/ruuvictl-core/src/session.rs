// ── Session ──
//
// Everything loaded from one gateway incarnation. A restart discards the
// session and a fresh load builds a new one; background work holding an
// old session keeps writing into it and is never observed.

use chrono::{DateTime, Utc};

use ruuvictl_api::GatewayConfig;

use crate::config::SnapshotRetention;
use crate::ledger::TagLedger;
use crate::model::DeviceSnapshot;
use crate::store::{ConfigStore, RestartFlag, SnapshotCache};

pub struct Session {
    config: ConfigStore,
    snapshots: SnapshotCache,
    restart: RestartFlag,
    loaded_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new(
        config: GatewayConfig,
        snapshots: Vec<DeviceSnapshot>,
        retention: SnapshotRetention,
    ) -> Self {
        let restart = RestartFlag::new();
        let cache = SnapshotCache::new(retention);
        cache.apply(snapshots);
        Self {
            config: ConfigStore::new(config, restart.clone()),
            snapshots: cache,
            restart,
            loaded_at: Utc::now(),
        }
    }

    /// The configuration store.
    ///
    /// Its writers push a whole document copy. Two writers running at once
    /// can undo each other, so concurrent callers go through
    /// [`Controller`](crate::Controller), which serializes them.
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn snapshots(&self) -> &SnapshotCache {
        &self.snapshots
    }

    /// Tag membership and names. Writes follow the same rule as
    /// [`config()`](Self::config).
    pub fn ledger(&self) -> TagLedger<'_> {
        TagLedger::new(&self.config)
    }

    pub fn restart_flag(&self) -> &RestartFlag {
        &self.restart
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
