//! Editing-session issuance: authorization, credential, session key and the
//! signed descriptor the editor widget boots from.

use crate::error::EditorError;
use crate::models::{DocumentKind, SessionKey, User};
use crate::services::authorization::AuthorizationGate;
use crate::services::backend::Directory;
use crate::services::credentials::{CredentialIssuer, normalize_query};
use crate::dtos::SessionTicket;
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::sync::Arc;

/// Editing capabilities granted to every session. Mirrors the product's
/// editor profile: tracked editing without export or collaboration chrome.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPermissions {
    pub chat: bool,
    pub comment: bool,
    pub copy: bool,
    pub download: bool,
    pub edit: bool,
    pub fill_forms: bool,
    pub modify_content_control: bool,
    pub modify_filter: bool,
    pub print: bool,
    pub protect: bool,
    pub rename: bool,
    pub review: bool,
}

impl Default for DocumentPermissions {
    fn default() -> Self {
        Self {
            chat: false,
            comment: false,
            copy: true,
            download: false,
            edit: true,
            fill_forms: false,
            modify_content_control: true,
            modify_filter: false,
            print: false,
            protect: true,
            rename: false,
            review: true,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDescriptor {
    pub file_type: String,
    pub key: String,
    pub title: String,
    pub url: String,
    pub permissions: DocumentPermissions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorUser {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorCustomization {
    pub autosave: bool,
    pub forcesave: bool,
    pub comments: bool,
    pub compact_header: bool,
    pub feedback: bool,
    pub help: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfigSection {
    pub callback_url: String,
    pub mode: String,
    pub user: EditorUser,
    pub customization: EditorCustomization,
}

/// The signed payload handed to the editor. Created once per edit
/// invocation and never persisted; its only durable trace is the embedded
/// session key, which the editor echoes back on save.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSessionDescriptor {
    pub document: DocumentDescriptor,
    pub document_type: String,
    pub editor_config: EditorConfigSection,
}

pub struct EditorTokenService {
    directory: Arc<dyn Directory>,
    gate: AuthorizationGate,
    issuer: CredentialIssuer,
    public_url: String,
    secret_key: Option<Secret<String>>,
}

impl EditorTokenService {
    pub fn new(
        directory: Arc<dyn Directory>,
        gate: AuthorizationGate,
        issuer: CredentialIssuer,
        public_url: String,
        secret_key: Option<Secret<String>>,
    ) -> Self {
        Self {
            directory,
            gate,
            issuer,
            public_url,
            secret_key,
        }
    }

    /// Open an editing session for one document on behalf of `user`.
    ///
    /// Authorization runs before anything is issued; a denial leaves no
    /// credential behind. Returns the signed descriptor token plus the
    /// proxied access URL for the editor widget.
    pub async fn start_session(
        &self,
        kind: DocumentKind,
        document_id: &str,
        user: &User,
    ) -> Result<SessionTicket, EditorError> {
        self.gate.authorize(user, kind, document_id).await?;

        let object_name = self
            .directory
            .document_object_name(kind, document_id)
            .await?
            .ok_or_else(|| {
                EditorError::NotFound(format!("{} {} has no document", kind, document_id))
            })?;

        let credential = self.issuer.issue(&object_name).await?;
        let blob_url = normalize_query(&credential.url)?;

        let session_key =
            SessionKey::new(Utc::now(), &object_name, kind, document_id, &user.sub)?;

        let access_url = format!(
            "{}/project/proxy_document?blob_url={}",
            self.public_url, blob_url
        );

        let descriptor = EditorSessionDescriptor {
            document: DocumentDescriptor {
                file_type: "docx".to_string(),
                key: session_key.encode(),
                title: object_name.clone(),
                url: access_url.clone(),
                permissions: DocumentPermissions::default(),
            },
            document_type: "word".to_string(),
            editor_config: EditorConfigSection {
                callback_url: format!("{}/onlyoffice/callback", self.public_url),
                mode: "edit".to_string(),
                user: EditorUser {
                    id: user.sub.clone(),
                    name: user.email.clone(),
                },
                customization: EditorCustomization {
                    autosave: true,
                    forcesave: true,
                    comments: false,
                    compact_header: true,
                    feedback: false,
                    help: false,
                },
            },
        };

        let secret_key = self
            .secret_key
            .as_ref()
            .ok_or(EditorError::SigningKeyMissing)?;

        let token = jsonwebtoken::encode(
            &Header::default(),
            &descriptor,
            &EncodingKey::from_secret(secret_key.expose_secret().as_bytes()),
        )
        .map_err(|e| anyhow::anyhow!("failed to sign session descriptor: {}", e))?;

        tracing::info!(
            kind = %kind,
            document_id = %document_id,
            user = %user.sub,
            object_name = %object_name,
            expires_at = %credential.expires_at,
            "Editing session opened"
        );

        Ok(SessionTicket { token, access_url })
    }
}
