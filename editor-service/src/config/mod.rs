use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Process-wide configuration, built once at startup and handed to the
/// application state. Nothing below reads the environment after load.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    pub common: core_config::Config,
    /// Base URL of the internal application's API (user directory, document
    /// records, capability checks).
    pub backend_url: String,
    /// Public base URL of this service, used when composing the proxied
    /// document URL and the editor callback URL.
    pub public_url: String,
    pub blob: BlobConfig,
    pub onlyoffice: OnlyOfficeConfig,
    pub storage: StorageConfig,
}

/// Object-store account settings, scoped by deployment environment
/// (`BLOB_ENV` selects which `{ENV}_BLOB_*` variable set applies).
#[derive(Debug, Clone)]
pub struct BlobConfig {
    pub endpoint: String,
    pub container: String,
    pub account_name: String,
    pub account_key: Secret<String>,
}

#[derive(Debug, Clone)]
pub struct OnlyOfficeConfig {
    /// Shared secret for signing editor session descriptors. Optional at
    /// load time; token issuance fails hard when it is missing.
    pub secret_key: Option<Secret<String>>,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub local_path: String,
}

impl EditorConfig {
    pub fn load() -> Result<Self, AppError> {
        // Loads .env and the APP__ prefixed common settings.
        let common = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let scope = env::var("BLOB_ENV")
            .unwrap_or_else(|_| "dev".to_string())
            .to_uppercase();

        Ok(EditorConfig {
            common,
            backend_url: get_env("BACKEND_URL", Some("http://127.0.0.1:8000"), is_prod)?,
            public_url: get_env("PUBLIC_URL", Some("http://127.0.0.1:8080"), is_prod)?,
            blob: BlobConfig {
                endpoint: get_env(
                    &format!("{}_BLOB_ENDPOINT", scope),
                    Some("http://127.0.0.1:10000/devstoreaccount1"),
                    is_prod,
                )?,
                container: get_env(
                    &format!("{}_BLOB_CONTAINER", scope),
                    Some("documents"),
                    is_prod,
                )?,
                account_name: get_env(
                    &format!("{}_BLOB_ACT_NAME", scope),
                    Some("devstoreaccount1"),
                    is_prod,
                )?,
                account_key: Secret::new(get_env(
                    &format!("{}_BLOB_ACT_KEY", scope),
                    Some("local-dev-account-key"),
                    is_prod,
                )?),
            },
            onlyoffice: OnlyOfficeConfig {
                secret_key: env::var("ONLYOFFICE_SECRET_KEY").ok().map(Secret::new),
            },
            storage: StorageConfig {
                local_path: get_env("STORAGE_LOCAL_PATH", Some("storage"), is_prod)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}
