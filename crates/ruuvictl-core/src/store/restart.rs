// ── Restart-required flag ──

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// Raised by every successful mutation; cleared by a completed restart
/// (which discards the whole session) or by explicit dismissal.
///
/// Clones share one flag.
#[derive(Debug, Clone)]
pub struct RestartFlag {
    tx: Arc<watch::Sender<bool>>,
}

impl RestartFlag {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn is_raised(&self) -> bool {
        *self.tx.borrow()
    }

    pub(crate) fn raise(&self) {
        if !self.tx.send_replace(true) {
            debug!("restart now required");
        }
    }

    pub(crate) fn clear(&self) {
        self.tx.send_replace(false);
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let flag = RestartFlag::new();
        let other = flag.clone();
        let rx = flag.subscribe();

        assert!(!flag.is_raised());
        other.raise();
        assert!(flag.is_raised());
        assert!(*rx.borrow());

        flag.clear();
        assert!(!other.is_raised());
    }
}
