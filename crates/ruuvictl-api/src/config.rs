// Configuration document endpoints

use tracing::debug;

use crate::client::GatewayClient;
use crate::error::Error;
use crate::types::GatewayConfig;

impl GatewayClient {
    /// Fetch the complete gateway configuration.
    ///
    /// `GET /api/config`
    pub async fn get_config(&self) -> Result<GatewayConfig, Error> {
        debug!("fetching gateway config");
        self.get("api/config").await
    }

    /// Replace the whole configuration document.
    ///
    /// `POST /api/config`
    ///
    /// The gateway persists the document as-is; it takes effect after a restart.
    pub async fn replace_config(&self, config: &GatewayConfig) -> Result<(), Error> {
        debug!(gw_mac = %config.gw_mac, "replacing gateway config");
        self.post_no_content("api/config", config).await
    }
}
