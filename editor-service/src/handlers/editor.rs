use crate::dtos::{CallbackAck, CallbackPayload};
use crate::middleware::UserId;
use crate::models::DocumentKind;
use crate::startup::AppState;
use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use metrics::counter;
use service_core::error::AppError;

/// Open an editing session: authorize, issue a scoped credential and hand
/// back the signed descriptor token plus the proxied document URL.
///
/// The request body carries editor-widget configuration this service does
/// not interpret; it is accepted and discarded.
pub async fn issue_token(
    State(state): State<AppState>,
    user_id: UserId,
    Path((kind, document_id)): Path<(String, String)>,
    Json(_editor_payload): Json<serde_json::Value>,
) -> Result<impl IntoResponse, AppError> {
    let kind: DocumentKind = kind.parse().map_err(AppError::from)?;

    let user = state
        .directory
        .find_user(&user_id.0)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("unknown subject {}", user_id.0)))?;

    let ticket = state
        .tokens
        .start_session(kind, &document_id, &user)
        .await?;

    counter!("editor_sessions_started_total").increment(1);

    Ok(Json(ticket))
}

/// Receive a save notification from the document server.
///
/// Always answers HTTP 200: pipeline failures are reported in the body,
/// which is the only channel the document server understands.
pub async fn editor_callback(
    State(state): State<AppState>,
    Json(payload): Json<CallbackPayload>,
) -> Json<CallbackAck> {
    tracing::info!(status = payload.status, "Editor callback received");
    Json(state.callbacks.handle(payload).await)
}
