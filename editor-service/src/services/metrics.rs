//! Prometheus metrics for the editing broker.
//!
//! The recorder is installed once from `main`; everything else records
//! through the `metrics` macros (session, callback and proxy counters plus
//! the per-request middleware).

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Must run before any metric is recorded;
/// repeated installation (a second process-wide recorder) is refused.
pub fn init_metrics() {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if METRICS_HANDLE.set(handle).is_err() {
                tracing::warn!("Metrics recorder already initialized");
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder");
        }
    }
}

/// Render the current metrics in Prometheus text format for /metrics.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}
