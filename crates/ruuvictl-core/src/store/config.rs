// ── Configuration store ──
//
// Holds the latest full gateway document. Readers get a cheap `Arc`
// clone; writers build a complete copy, push it, and swap it in only
// after the gateway accepted it.

use std::sync::Arc;

use arc_swap::ArcSwap;
use indexmap::IndexMap;
use tracing::info;

use ruuvictl_api::{GatewayClient, GatewayConfig};

use crate::error::CoreError;
use crate::model::{ConfigDocument, SinkConfig, SinkId};
use crate::store::RestartFlag;

pub struct ConfigStore {
    current: ArcSwap<GatewayConfig>,
    restart: RestartFlag,
}

impl ConfigStore {
    pub(crate) fn new(config: GatewayConfig, restart: RestartFlag) -> Self {
        Self {
            current: ArcSwap::from_pointee(config),
            restart,
        }
    }

    /// The current full document.
    pub fn get(&self) -> Arc<GatewayConfig> {
        self.current.load_full()
    }

    pub fn sink(&self, id: SinkId) -> Option<SinkConfig> {
        self.current.load().sink(id)
    }

    /// Replace one sink section on the gateway.
    ///
    /// `id` must name one of the five sinks and agree with the variant of
    /// `config`. Absent fields of an enabled sink are defaulted. The stored
    /// document changes only if the gateway accepted the new one.
    ///
    /// The copy is taken before the request and installed whole afterwards,
    /// so a tag write-back landing in between is lost. Callers must not run
    /// this alongside other writes to the same session; `Controller` holds
    /// its write lock for the whole call.
    pub async fn replace_sink(
        &self,
        client: &GatewayClient,
        id: &str,
        config: SinkConfig,
    ) -> Result<(), CoreError> {
        let id = SinkId::parse(id)?;
        if config.id() != id {
            return Err(CoreError::Validation {
                message: format!("{} settings cannot be saved as {id}", config.id()),
            });
        }

        let next = self.get().with_sink(config.with_defaults());
        client.replace_config(&next).await?;

        self.current.store(Arc::new(next));
        self.restart.raise();
        info!(sink = %id, "sink configuration saved");
        Ok(())
    }

    /// Install the gateway's authoritative allowlist.
    pub(crate) fn apply_enabled_tags(&self, tags: Vec<String>) {
        self.current
            .rcu(|current| Arc::new(current.with_enabled_tags(tags.clone())));
    }

    /// Install the gateway's authoritative name map.
    pub(crate) fn apply_tag_names(&self, names: IndexMap<String, String>) {
        self.current
            .rcu(|current| Arc::new(current.with_tag_names(names.clone())));
    }

    pub(crate) fn restart_flag(&self) -> &RestartFlag {
        &self.restart
    }
}
