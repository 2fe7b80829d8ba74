use crate::config::EditorConfig;
use crate::handlers;
use crate::models::DocumentKind;
use crate::services::{
    AuthorizationGate, BackendClient, BlobSigner, CallbackService, CredentialIssuer, Directory,
    EditorTokenService, LocalStorage, ProxyGateway, SharedKeySigner, Storage,
};
use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::security_headers::security_headers_middleware;
use service_core::middleware::tracing::request_id_middleware;
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: EditorConfig,
    pub directory: Arc<dyn Directory>,
    pub tokens: Arc<EditorTokenService>,
    pub callbacks: Arc<CallbackService>,
    pub proxy: Arc<ProxyGateway>,
}

pub struct Application {
    port: u16,
    server: Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>,
}

impl Application {
    pub async fn build(config: EditorConfig) -> Result<Self, AppError> {
        let storage: Arc<dyn Storage> = Arc::new(
            LocalStorage::new(&config.storage.local_path)
                .await
                .map_err(|e| {
                    tracing::error!(
                        "Failed to initialize local storage at {}: {}",
                        config.storage.local_path,
                        e
                    );
                    e
                })?,
        );

        let backend = Arc::new(BackendClient::new(
            config.backend_url.trim_end_matches('/').to_string(),
        ));
        let directory: Arc<dyn Directory> = backend.clone();

        let gate = AuthorizationGate::new(
            BackendClient::capability_oracle(&backend, DocumentKind::Candidate),
            BackendClient::capability_oracle(&backend, DocumentKind::JobPost),
        );

        let signer: Arc<dyn BlobSigner> = Arc::new(SharedKeySigner::new(&config.blob));
        let issuer = CredentialIssuer::new(&config.blob, signer);

        let tokens = Arc::new(EditorTokenService::new(
            directory.clone(),
            gate.clone(),
            issuer,
            config.public_url.trim_end_matches('/').to_string(),
            config.onlyoffice.secret_key.clone(),
        ));

        let callbacks = Arc::new(CallbackService::new(directory.clone(), gate, storage));

        let state = AppState {
            config: config.clone(),
            directory,
            tokens,
            callbacks,
            proxy: Arc::new(ProxyGateway::new()),
        };

        let app = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/metrics", get(handlers::metrics_endpoint))
            .route("/onlyoffice/callback", post(handlers::editor_callback))
            .route("/onlyoffice/token/:kind/:id", post(handlers::issue_token))
            .route("/project/proxy_document", get(handlers::proxy_document))
            .layer(from_fn(security_headers_middleware))
            .layer(from_fn(metrics_middleware))
            .layer(from_fn(request_id_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                        user_id = tracing::field::Empty,
                    )
                }),
            )
            .with_state(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::pin(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
