use service_core::error::AppError;
use thiserror::Error;

/// Failures of the editing-session pipeline.
///
/// The synchronous endpoints surface these as HTTP statuses; the save
/// callback downgrades every variant into an in-band `{"error":1}`
/// acknowledgment at the pipeline boundary.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("malformed session key: {0}")]
    MalformedKey(String),

    #[error("unsupported document kind: {0}")]
    UnsupportedDocumentKind(String),

    #[error("not authorized to access {kind} {document_id}")]
    Forbidden { kind: String, document_id: String },

    #[error("{0}")]
    NotFound(String),

    #[error("editor signing key is not configured")]
    SigningKeyMissing,

    #[error("upstream fetch failed with status {status}")]
    UpstreamFetchFailed { status: u16 },

    #[error("storage commit failed: {0}")]
    StorageCommitFailed(#[source] anyhow::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<EditorError> for AppError {
    fn from(err: EditorError) -> Self {
        match err {
            EditorError::MalformedKey(_) | EditorError::UnsupportedDocumentKind(_) => {
                AppError::BadRequest(anyhow::anyhow!(err.to_string()))
            }
            EditorError::Forbidden { .. } => AppError::Forbidden(anyhow::anyhow!(err.to_string())),
            EditorError::NotFound(_) => AppError::NotFound(anyhow::anyhow!(err.to_string())),
            EditorError::SigningKeyMissing => {
                AppError::ConfigError(anyhow::anyhow!(err.to_string()))
            }
            EditorError::UpstreamFetchFailed { .. } | EditorError::StorageCommitFailed(_) => {
                AppError::InternalError(anyhow::anyhow!(err.to_string()))
            }
            EditorError::Internal(e) => AppError::InternalError(e),
        }
    }
}
