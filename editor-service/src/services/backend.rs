//! Client for the internal application's API.
//!
//! The application owns users, candidates and job posts; this service only
//! needs three read-only answers from it: who a subject is, which storage
//! object backs a document, and whether a user may touch that document.

use crate::error::EditorError;
use crate::models::{DocumentKind, User};
use crate::services::authorization::CapabilityOracle;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use service_core::observability::TracedClientExt;
use std::sync::Arc;

/// Lookup interface the session pipeline depends on.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Resolve a subject to a live user; `None` when unknown or deactivated.
    async fn find_user(&self, sub: &str) -> Result<Option<User>, EditorError>;

    /// Name of the storage object backing the document, `None` when the
    /// document does not exist or has no generated file yet.
    async fn document_object_name(
        &self,
        kind: DocumentKind,
        document_id: &str,
    ) -> Result<Option<String>, EditorError>;
}

#[derive(Debug, Deserialize)]
struct DocumentSourceResponse {
    object_name: String,
}

#[derive(Debug, Deserialize)]
struct AccessResponse {
    allowed: bool,
}

pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Capability oracle view of the shared client for one document kind.
    pub fn capability_oracle(
        backend: &Arc<BackendClient>,
        kind: DocumentKind,
    ) -> Arc<dyn CapabilityOracle> {
        Arc::new(KindOracle {
            backend: Arc::clone(backend),
            kind,
        })
    }

    /// GET a JSON resource; 404 maps to `None`, other non-2xx statuses fail.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, EditorError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self.client.traced_get(&url).send().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Backend request failed");
            anyhow::anyhow!("backend request failed: {}", e)
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            tracing::error!(url = %url, status = %status, "Backend returned error status");
            return Err(EditorError::Internal(anyhow::anyhow!(
                "backend returned status {} for {}",
                status,
                path
            )));
        }

        let value = response.json::<T>().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Failed to parse backend response");
            anyhow::anyhow!("failed to parse backend response: {}", e)
        })?;

        Ok(Some(value))
    }

    async fn can_access(
        &self,
        kind: DocumentKind,
        user: &User,
        document_id: &str,
    ) -> Result<bool, EditorError> {
        let path = format!(
            "/internal/{}/{}/access/{}",
            kind.path_segment(),
            document_id,
            user.sub
        );

        // An unknown document or subject cannot be accessed.
        let response: Option<AccessResponse> = self.get_json(&path).await?;
        Ok(response.map(|r| r.allowed).unwrap_or(false))
    }
}

#[async_trait]
impl Directory for BackendClient {
    async fn find_user(&self, sub: &str) -> Result<Option<User>, EditorError> {
        let user: Option<User> = self.get_json(&format!("/internal/users/{}", sub)).await?;
        Ok(user.filter(|u| u.active))
    }

    async fn document_object_name(
        &self,
        kind: DocumentKind,
        document_id: &str,
    ) -> Result<Option<String>, EditorError> {
        let path = format!("/internal/{}/{}/document", kind.path_segment(), document_id);
        let source: Option<DocumentSourceResponse> = self.get_json(&path).await?;
        Ok(source.map(|s| s.object_name))
    }
}

/// One document kind's capability check, backed by the shared client.
struct KindOracle {
    backend: Arc<BackendClient>,
    kind: DocumentKind,
}

#[async_trait]
impl CapabilityOracle for KindOracle {
    async fn can_access(&self, user: &User, document_id: &str) -> Result<bool, EditorError> {
        self.backend.can_access(self.kind, user, document_id).await
    }
}
