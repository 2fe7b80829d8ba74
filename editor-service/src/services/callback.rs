//! Save-notification state machine for the document server.
//!
//! Statuses: 1 = still editing, 2 = ready to save, 6 = closed or errored.
//! Only status 2 does work; everything else (including statuses this service
//! does not know) is acknowledged without action, because the document
//! server treats anything but a well-formed acknowledgment as a delivery
//! failure and keeps retrying.

use crate::dtos::{CallbackAck, CallbackPayload};
use crate::error::EditorError;
use crate::models::SessionKey;
use crate::services::authorization::AuthorizationGate;
use crate::services::backend::Directory;
use crate::services::storage::Storage;
use metrics::counter;
use reqwest::Client;
use std::sync::Arc;

pub const STATUS_EDITING: i32 = 1;
pub const STATUS_SAVE_READY: i32 = 2;
pub const STATUS_CLOSED: i32 = 6;

pub struct CallbackService {
    directory: Arc<dyn Directory>,
    gate: AuthorizationGate,
    storage: Arc<dyn Storage>,
    client: Client,
}

impl CallbackService {
    pub fn new(
        directory: Arc<dyn Directory>,
        gate: AuthorizationGate,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            directory,
            gate,
            storage,
            client: Client::new(),
        }
    }

    /// Process one notification and produce the in-band acknowledgment.
    ///
    /// Failures never escape this method: the save pipeline's errors are
    /// logged and downgraded into `{"error":1,"message"}` here, at the
    /// boundary.
    pub async fn handle(&self, payload: CallbackPayload) -> CallbackAck {
        match payload.status {
            STATUS_SAVE_READY => match self.save(payload).await {
                Ok(()) => {
                    counter!("editor_callbacks_total", "outcome" => "saved").increment(1);
                    CallbackAck::ok()
                }
                Err(e) => {
                    counter!("editor_callbacks_total", "outcome" => "failed").increment(1);
                    tracing::error!(error = %e, "Save callback failed");
                    CallbackAck::failed(e.to_string())
                }
            },
            STATUS_EDITING | STATUS_CLOSED => {
                counter!("editor_callbacks_total", "outcome" => "noop").increment(1);
                tracing::debug!(status = payload.status, "Editor callback acknowledged");
                CallbackAck::ok()
            }
            other => {
                counter!("editor_callbacks_total", "outcome" => "noop").increment(1);
                tracing::debug!(status = other, "Unhandled editor callback status");
                CallbackAck::ok()
            }
        }
    }

    async fn save(&self, payload: CallbackPayload) -> Result<(), EditorError> {
        let (url, key) = match (payload.url, payload.key) {
            (Some(url), Some(key)) => (url, key),
            _ => {
                return Err(EditorError::Internal(anyhow::anyhow!(
                    "missing url or key in save notification"
                )));
            }
        };

        let session = SessionKey::decode(&key)?;

        // The callback is unauthenticated; the only identity assertion is
        // the user id inside the key, so it is re-resolved and re-checked
        // before anything touches storage.
        let user = self
            .directory
            .find_user(session.user_id())
            .await?
            .ok_or_else(|| {
                EditorError::NotFound(format!("user {} not found", session.user_id()))
            })?;

        self.gate
            .authorize(&user, session.kind(), session.document_id())
            .await?;

        let bytes = self.fetch_document(&url).await?;

        self.storage
            .upload(session.object_name(), bytes)
            .await
            .map_err(|e| EditorError::StorageCommitFailed(anyhow::Error::new(e)))?;

        counter!("editor_documents_saved_total").increment(1);
        tracing::info!(
            kind = %session.kind(),
            document_id = %session.document_id(),
            object_name = %session.object_name(),
            user = %session.user_id(),
            "Document saved from editor callback"
        );

        Ok(())
    }

    /// Download the finalized document from the editor's transient host.
    /// One attempt only; the document server retries the whole callback.
    async fn fetch_document(&self, url: &str) -> Result<Vec<u8>, EditorError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Failed to reach document host");
            anyhow::anyhow!("failed to fetch finalized document: {}", e)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(url = %url, status = %status, "Document host returned error status");
            return Err(EditorError::UpstreamFetchFailed {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| anyhow::anyhow!("failed to read finalized document body: {}", e))?;

        Ok(bytes.to_vec())
    }
}
