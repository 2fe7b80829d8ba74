use crate::error::EditorError;
use reqwest::{Client, Response};

/// Relays an externally hosted document through this service's origin.
///
/// The editor runs in the browser and cannot read the blob host directly;
/// this gateway fetches on its behalf and streams the body back without
/// buffering it whole.
pub struct ProxyGateway {
    client: Client,
}

impl ProxyGateway {
    pub fn new() -> Self {
        Self {
            // Redirects are followed with reqwest's default policy.
            client: Client::new(),
        }
    }

    /// GET the target once. Non-2xx upstream responses become
    /// `UpstreamFetchFailed` carrying the upstream status; no retry.
    pub async fn fetch(&self, target_url: &str) -> Result<Response, EditorError> {
        let response = self.client.get(target_url).send().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to reach document upstream");
            anyhow::anyhow!("failed to fetch document: {}", e)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = %status, "Document upstream returned error status");
            return Err(EditorError::UpstreamFetchFailed {
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

impl Default for ProxyGateway {
    fn default() -> Self {
        Self::new()
    }
}
