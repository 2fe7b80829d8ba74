use editor_service::config::{BlobConfig, EditorConfig, OnlyOfficeConfig, StorageConfig};
use editor_service::startup::Application;
use secrecy::Secret;
use serde_json::json;
use service_core::config::Config as CoreConfig;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_SECRET: &str = "test-editor-secret";
pub const TEST_PUBLIC_URL: &str = "https://app.test";

/// A running editor-service instance with wiremock doubles standing in for
/// the internal application (`backend`) and the document/blob host
/// (`upstream`).
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub backend: MockServer,
    pub upstream: MockServer,
    pub storage_path: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_secret(Some(TEST_SECRET)).await
    }

    pub async fn spawn_with_secret(secret: Option<&str>) -> Self {
        let backend = MockServer::start().await;
        let upstream = MockServer::start().await;
        let storage_path = format!("target/test-storage-{}", Uuid::new_v4());

        let config = EditorConfig {
            common: CoreConfig { port: 0 },
            backend_url: backend.uri(),
            public_url: TEST_PUBLIC_URL.to_string(),
            blob: BlobConfig {
                endpoint: upstream.uri(),
                container: "documents".to_string(),
                account_name: "testaccount".to_string(),
                account_key: Secret::new("test-account-key".to_string()),
            },
            onlyoffice: OnlyOfficeConfig {
                secret_key: secret.map(|s| Secret::new(s.to_string())),
            },
            storage: StorageConfig {
                local_path: storage_path.clone(),
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept requests.
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            backend,
            upstream,
            storage_path,
            client,
        }
    }

    /// Register a live user in the fake directory.
    pub async fn given_user(&self, sub: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/internal/users/{}", sub)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sub": sub,
                "email": format!("{}@example.com", sub),
                "active": true,
            })))
            .mount(&self.backend)
            .await;
    }

    /// Register a capability-check answer for one (kind, document, subject).
    pub async fn given_access(&self, segment: &str, document_id: &str, sub: &str, allowed: bool) {
        Mock::given(method("GET"))
            .and(path(format!(
                "/internal/{}/{}/access/{}",
                segment, document_id, sub
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "allowed": allowed })))
            .mount(&self.backend)
            .await;
    }

    /// Register the storage object backing one document.
    pub async fn given_document(&self, segment: &str, document_id: &str, object_name: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/internal/{}/{}/document", segment, document_id)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "object_name": object_name })),
            )
            .mount(&self.backend)
            .await;
    }

    /// Bytes committed to local storage under `object_name`, if any.
    pub async fn stored_bytes(&self, object_name: &str) -> Option<Vec<u8>> {
        tokio::fs::read(format!("{}/{}", self.storage_path, object_name))
            .await
            .ok()
    }

    /// True when nothing has been committed to storage.
    pub async fn storage_is_empty(&self) -> bool {
        let mut entries = match tokio::fs::read_dir(&self.storage_path).await {
            Ok(entries) => entries,
            Err(_) => return true,
        };
        entries.next_entry().await.ok().flatten().is_none()
    }

    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.storage_path).await;
    }
}
