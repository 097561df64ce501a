// System endpoints: Matter commissioning info, process restart

use tracing::debug;

use crate::client::GatewayClient;
use crate::error::Error;
use crate::types::{MatterStatus, RestartResponse};

impl GatewayClient {
    /// Get the Matter bridge pairing code and QR payload.
    ///
    /// `GET /api/matter`
    ///
    /// Fails with a non-2xx `Error::Api` when the bridge is not running.
    pub async fn matter_status(&self) -> Result<MatterStatus, Error> {
        debug!("fetching matter status");
        self.get("api/matter").await
    }

    /// Ask the gateway process to restart and re-read its configuration.
    ///
    /// `POST /api/restart`
    pub async fn restart(&self) -> Result<RestartResponse, Error> {
        debug!("requesting gateway restart");
        self.post_empty("api/restart").await
    }
}
