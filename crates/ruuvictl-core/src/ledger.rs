// ── Tag membership and naming ──
//
// Whether a tag is forwarded to the sinks, and what it is called. The
// gateway merges both collections itself; every answer carries the full
// updated collection, which is written back into the store as-is.

use tracing::{info, warn};

use ruuvictl_api::GatewayClient;

use crate::error::{CoreError, TagField};
use crate::model::{ConfigDocument, MacAddress};
use crate::store::ConfigStore;

/// Requested changes for one tag. `None` leaves that field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagEdit {
    pub name: Option<String>,
    pub enabled: Option<bool>,
}

impl TagEdit {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.enabled.is_none()
    }
}

/// View over the tag fields of a [`ConfigStore`].
pub struct TagLedger<'a> {
    store: &'a ConfigStore,
}

impl<'a> TagLedger<'a> {
    pub fn new(store: &'a ConfigStore) -> Self {
        Self { store }
    }

    /// Whether `mac` is on the forwarding allowlist.
    ///
    /// An absent or empty allowlist enables nothing.
    pub fn is_enabled(&self, mac: &MacAddress) -> bool {
        self.store.get().lists_enabled(mac)
    }

    /// The operator-assigned name, if any.
    pub fn custom_name(&self, mac: &MacAddress) -> Option<String> {
        self.store.get().name_for(mac).map(str::to_owned)
    }

    /// The assigned name, or `RuuviTag EE:FF` from the last two octets.
    pub fn display_name(&self, mac: &MacAddress) -> String {
        self.custom_name(mac)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("RuuviTag {}", mac.short_suffix()))
    }

    /// Add `mac` to, or remove it from, the allowlist.
    pub async fn set_enabled(
        &self,
        client: &GatewayClient,
        mac: &MacAddress,
        enabled: bool,
    ) -> Result<(), CoreError> {
        let resp = client.set_tag_enabled(mac.as_str(), enabled).await?;
        if !resp.success {
            return Err(CoreError::Rejected {
                message: format!("could not {} {mac}", if enabled { "enable" } else { "disable" }),
            });
        }

        self.store.apply_enabled_tags(resp.enabled_tags);
        self.store.restart_flag().raise();
        info!(%mac, enabled, "tag membership saved");
        Ok(())
    }

    /// Name `mac`. An empty name removes the mapping.
    pub async fn set_name(
        &self,
        client: &GatewayClient,
        mac: &MacAddress,
        name: &str,
    ) -> Result<(), CoreError> {
        let name = name.trim();
        let resp = client.set_tag_name(mac.as_str(), name).await?;
        if !resp.success {
            return Err(CoreError::Rejected {
                message: format!("could not rename {mac}"),
            });
        }

        self.store.apply_tag_names(resp.tag_names);
        self.store.restart_flag().raise();
        info!(%mac, name, "tag name saved");
        Ok(())
    }

    /// Apply a name and membership change as two independent calls.
    ///
    /// Both are attempted even if the first fails. When exactly one
    /// succeeds the result is [`CoreError::PartialMutation`] and the saved
    /// half stays saved.
    pub async fn apply_edit(
        &self,
        client: &GatewayClient,
        mac: &MacAddress,
        edit: TagEdit,
    ) -> Result<(), CoreError> {
        let named = match edit.name.as_deref() {
            Some(name) => Some(self.set_name(client, mac, name).await),
            None => None,
        };
        let toggled = match edit.enabled {
            Some(enabled) => Some(self.set_enabled(client, mac, enabled).await),
            None => None,
        };

        match (named, toggled) {
            (Some(Ok(())), Some(Err(e))) => {
                warn!(%mac, error = %e, "tag renamed but membership change failed");
                Err(CoreError::PartialMutation {
                    saved: TagField::Name,
                    failed: TagField::Enabled,
                    source: Box::new(e),
                })
            }
            (Some(Err(e)), Some(Ok(()))) => {
                warn!(%mac, error = %e, "tag membership changed but rename failed");
                Err(CoreError::PartialMutation {
                    saved: TagField::Enabled,
                    failed: TagField::Name,
                    source: Box::new(e),
                })
            }
            (Some(Err(e)), _) | (_, Some(Err(e))) => Err(e),
            _ => Ok(()),
        }
    }
}
