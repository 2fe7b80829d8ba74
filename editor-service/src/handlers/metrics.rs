use crate::services::metrics::get_metrics;
use axum::{http::StatusCode, response::IntoResponse};

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
