// Gateway API HTTP client
//
// Wraps `reqwest::Client` with URL construction and response decoding.
// Endpoint groups (config, tags, system) are implemented as inherent
// methods in separate files to keep this module focused on transport.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Longest body excerpt carried in an `Error::Api` message.
const PREVIEW_CHARS: usize = 200;

/// Raw HTTP client for the gateway's management API.
///
/// Every method returns a fully decoded payload: the body is read to the
/// end and parsed in one step, so a failed call never yields partial data.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GatewayClient {
    /// Create a client for the gateway at `base_url` (e.g. `http://gateway.local:8080`).
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, mut base_url: Url) -> Self {
        // `Url::join` replaces the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url }
    }

    /// The gateway base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path such as `api/tags`.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        Self::decode(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);

        let resp = self.http.post(url).json(body).send().await?;
        Self::decode(resp).await
    }

    /// POST a JSON body where the answer carries no payload of interest.
    pub(crate) async fn post_no_content(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);

        let resp = self.http.post(url).json(body).send().await?;
        Self::check_status(resp).await?;
        Ok(())
    }

    /// POST without a request body.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);

        let resp = self.http.post(url).send().await?;
        Self::decode(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(Error::Api {
            status: status.as_u16(),
            message: preview(body.trim()),
        })
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let resp = Self::check_status(resp).await?;
        let body = resp.text().await?;
        trace!(bytes = body.len(), "response body received");

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }
}

fn preview(body: &str) -> String {
    body.chars().take(PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> GatewayClient {
        let url = Url::parse(base).expect("valid test URL");
        GatewayClient::with_client(reqwest::Client::new(), url)
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let c = client("http://gw.local:8080/panel");
        assert_eq!(c.base_url().as_str(), "http://gw.local:8080/panel/");
        let url = c.url("api/tags").expect("join");
        assert_eq!(url.as_str(), "http://gw.local:8080/panel/api/tags");
    }

    #[test]
    fn root_base_url_joins_plainly() {
        let c = client("http://10.0.0.5:8080");
        let url = c.url("api/config").expect("join");
        assert_eq!(url.as_str(), "http://10.0.0.5:8080/api/config");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(300);
        let p = preview(&body);
        assert_eq!(p.chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn new_rejects_garbage_url() {
        let err = GatewayClient::new("not a url", &TransportConfig::default())
            .expect_err("must not parse");
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
