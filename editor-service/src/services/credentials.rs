use crate::config::BlobConfig;
use crate::error::EditorError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;

/// Fixed lifetime of an issued credential. Not renewable; the editor must
/// finish loading the document well within this window.
const ACCESS_TTL_SECS: i64 = 3600;

/// Permissions requested for an editing session: the editor reads the
/// current document and the save pipeline writes the finalized one back.
const ACCESS_PERMISSIONS: &str = "rw";

/// A time-bounded, permission-scoped grant to one storage object.
#[derive(Debug, Clone)]
pub struct ScopedCredential {
    /// Object URL carrying the signed query string.
    pub url: String,
    /// Absolute expiry, fixed at issuance.
    pub expires_at: DateTime<Utc>,
}

/// Produces the signed query string granting access to one object.
///
/// The store's own credential scheme lives behind this trait; the service
/// only relies on "a query string that the store will honor until expiry".
#[async_trait]
pub trait BlobSigner: Send + Sync {
    async fn sign(
        &self,
        object_name: &str,
        permissions: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, EditorError>;
}

/// Shared-key signer: HMAC-SHA256 over the container, object, permissions
/// and expiry, emitted in a SAS-shaped query string. The signature is hex,
/// so every value in the query survives percent-encoding untouched.
pub struct SharedKeySigner {
    container: String,
    account_name: String,
    account_key: Secret<String>,
}

impl SharedKeySigner {
    pub fn new(blob: &BlobConfig) -> Self {
        Self {
            container: blob.container.clone(),
            account_name: blob.account_name.clone(),
            account_key: blob.account_key.clone(),
        }
    }
}

#[async_trait]
impl BlobSigner for SharedKeySigner {
    async fn sign(
        &self,
        object_name: &str,
        permissions: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, EditorError> {
        let expires = expires_at.timestamp();
        let signature = service_core::utils::signature::generate_object_signature(
            self.account_key.expose_secret(),
            &self.container,
            object_name,
            permissions,
            expires,
        )
        .map_err(EditorError::Internal)?;

        Ok(format!(
            "sp={}&se={}&sn={}&sig={}",
            permissions, expires, self.account_name, signature
        ))
    }
}

/// Issues scoped credentials for storage objects and owns the one-hour
/// expiry policy.
#[derive(Clone)]
pub struct CredentialIssuer {
    endpoint: String,
    container: String,
    signer: Arc<dyn BlobSigner>,
}

impl CredentialIssuer {
    pub fn new(blob: &BlobConfig, signer: Arc<dyn BlobSigner>) -> Self {
        Self {
            endpoint: blob.endpoint.trim_end_matches('/').to_string(),
            container: blob.container.clone(),
            signer,
        }
    }

    /// Request a read+write grant for one object.
    ///
    /// The expiry instant is captured once and reused for both the signature
    /// and the returned credential; signer failures abort the whole session
    /// start, never yielding a partial credential.
    pub async fn issue(&self, object_name: &str) -> Result<ScopedCredential, EditorError> {
        let expires_at = Utc::now() + Duration::seconds(ACCESS_TTL_SECS);
        let query = self
            .signer
            .sign(object_name, ACCESS_PERMISSIONS, expires_at)
            .await?;

        Ok(ScopedCredential {
            url: format!(
                "{}/{}/{}?{}",
                self.endpoint, self.container, object_name, query
            ),
            expires_at,
        })
    }
}

/// Re-encode a signed URL's query string so the whole URL can ride inside
/// another URL's query parameter.
///
/// Every key and value is percent-decoded exactly once and re-encoded with
/// the strict unreserved alphabet (`A-Z a-z 0-9 - _ . ~`), escaping `:`,
/// `%`, `&`, `=` and friends. The consumer of the embedded URL applies the
/// single matching decode. Idempotent, and the multiset of (key, value)
/// pairs is preserved.
pub fn normalize_query(url: &str) -> Result<String, EditorError> {
    let Some((base, query)) = url.split_once('?') else {
        return Ok(url.to_string());
    };

    let mut encoded = Vec::new();
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = urlencoding::decode(key)
            .map_err(|e| anyhow::anyhow!("invalid percent-encoding in query key: {}", e))?;
        let value = urlencoding::decode(value)
            .map_err(|e| anyhow::anyhow!("invalid percent-encoding in query value: {}", e))?;
        encoded.push(format!(
            "{}={}",
            urlencoding::encode(&key),
            urlencoding::encode(&value)
        ));
    }

    Ok(format!("{}?{}", base, encoded.join("&")))
}
