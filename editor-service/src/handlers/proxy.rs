use crate::startup::AppState;
use axum::{
    body::Body,
    extract::{RawQuery, State},
    http::{StatusCode, header},
    response::Response,
};
use service_core::error::AppError;

/// Content type the editor expects for wordprocessing documents.
const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Stream an externally hosted document through this service's origin.
///
/// The signed blob URL arrives percent-encoded as the `blob_url` query
/// parameter. It is taken as the raw remainder of the query string and
/// decoded exactly once; decoding again would corrupt the signature-bearing
/// characters inside its own query values.
pub async fn proxy_document(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    let query = query.unwrap_or_default();
    let target_url = extract_blob_url(&query)
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("missing blob_url parameter")))?;

    tracing::info!("Proxying document from upstream");

    let upstream = state.proxy.fetch(&target_url).await.map_err(AppError::from)?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, DOCX_CONTENT_TYPE)
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=document.docx",
        )
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::ACCESS_CONTROL_EXPOSE_HEADERS, "Content-Disposition")
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("failed to build response: {}", e)))?;

    Ok(response)
}

/// Everything after `blob_url=` is the parameter value, embedded `&` and
/// `=` included; the single percent-decode below is the inverse of the
/// encoding applied when the URL was issued.
fn extract_blob_url(query: &str) -> Option<String> {
    let start = query.find("blob_url=")? + "blob_url=".len();
    let raw = &query[start..];
    if raw.is_empty() {
        return None;
    }
    urlencoding::decode(raw).ok().map(|s| s.into_owned())
}
