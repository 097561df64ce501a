// Client-side state: configuration document, tag readings, restart flag.

mod config;
mod restart;
mod snapshots;

pub use config::ConfigStore;
pub use restart::RestartFlag;
pub use snapshots::{CachedSnapshot, SnapshotCache, SnapshotList};
