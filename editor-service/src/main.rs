use editor_service::config::EditorConfig;
use editor_service::services::init_metrics;
use editor_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize metrics recorder (must be before any metrics are recorded)
    init_metrics();

    // Initialize tracing; span export is enabled only when a collector is set
    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing("editor-service", "info", otlp_endpoint.as_deref());

    let config = EditorConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
