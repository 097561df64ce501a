// Tag endpoints: live readings, allowlist membership, display names

use tracing::debug;

use crate::client::GatewayClient;
use crate::error::Error;
use crate::types::{TagEnableRequest, TagEnableResponse, TagNameRequest, TagNameResponse, TagRecord};

impl GatewayClient {
    /// List every tag the gateway has heard since it started.
    ///
    /// `GET /api/tags`
    pub async fn list_tags(&self) -> Result<Vec<TagRecord>, Error> {
        debug!("listing tags");
        self.get("api/tags").await
    }

    /// Add a tag to, or remove it from, the forwarding allowlist.
    ///
    /// `POST /api/tags/enable`
    ///
    /// The answer carries the complete allowlist after the update.
    pub async fn set_tag_enabled(&self, mac: &str, enabled: bool) -> Result<TagEnableResponse, Error> {
        debug!(mac, enabled, "setting tag membership");
        self.post("api/tags/enable", &TagEnableRequest { mac, enabled })
            .await
    }

    /// Assign a display name to a tag. An empty name removes the mapping.
    ///
    /// `POST /api/tags/name`
    pub async fn set_tag_name(&self, mac: &str, name: &str) -> Result<TagNameResponse, Error> {
        debug!(mac, name, "setting tag name");
        self.post("api/tags/name", &TagNameRequest { mac, name }).await
    }
}
