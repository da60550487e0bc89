use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::core::{PdfConfig, ServiceError, ServiceResult};
use crate::pdf::InvoiceRenderer;
use crate::storage::s3::S3Settings;
use crate::storage::{LocalStore, ObjectStore, S3Client, StorageService};

#[derive(Clone)]
pub struct ApiState {
    pub storage: Arc<StorageService>,
    pub renderer: Arc<InvoiceRenderer>,
    pub config: Arc<AppConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageConfig {
    Local { dir: PathBuf, server_url: String },
    S3(S3Settings),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub upload_token: String,
    pub storage: StorageConfig,
    /// Pass the request `Host` header to the store for URL construction.
    pub prefer_request_host: bool,
    pub unique_object_keys: bool,
    pub max_upload_size_bytes: usize,
}

impl AppConfig {
    /// Local-disk configuration with every other setting at its default.
    pub fn local(dir: impl Into<PathBuf>, server_url: impl Into<String>, upload_token: impl Into<String>) -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 8001,
            upload_token: upload_token.into(),
            storage: StorageConfig::Local {
                dir: dir.into(),
                server_url: server_url.into(),
            },
            prefer_request_host: true,
            unique_object_keys: false,
            max_upload_size_bytes: 104_857_600, // 100MB
        }
    }

    pub fn from_env() -> ServiceResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> ServiceResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let upload_token = get("UPLOAD_TOKEN")
            .ok_or_else(|| ServiceError::Config("UPLOAD_TOKEN must be set".to_string()))?;

        let storage = match get("STORAGE_BACKEND").as_deref().unwrap_or("local") {
            "local" => StorageConfig::Local {
                dir: PathBuf::from(get("UPLOAD_DIR").unwrap_or_else(|| "./uploads".to_string())),
                server_url: get("SERVER_URL").unwrap_or_else(|| "http://localhost:8001".to_string()),
            },
            "s3" | "minio" => StorageConfig::S3(S3Settings {
                endpoint: get("MINIO_ENDPOINT").unwrap_or_else(|| "localhost".to_string()),
                port: parse_var(&get, "MINIO_PORT", 9000)?,
                use_ssl: parse_flag(&get, "MINIO_USE_SSL", false)?,
                access_key: get("MINIO_ACCESS_KEY"),
                secret_key: get("MINIO_SECRET_KEY"),
                bucket: get("MINIO_BUCKET").unwrap_or_else(|| "uploads".to_string()),
                region: get("MINIO_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                public_host: get("PUBLIC_HOST"),
            }),
            other => {
                return Err(ServiceError::Config(format!(
                    "Unknown STORAGE_BACKEND '{}', expected 'local' or 's3'",
                    other
                )))
            }
        };

        Ok(AppConfig {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var(&get, "PORT", 8001)?,
            upload_token,
            storage,
            prefer_request_host: parse_flag(&get, "PREFER_REQUEST_HOST", true)?,
            unique_object_keys: parse_flag(&get, "UNIQUE_OBJECT_KEYS", false)?,
            max_upload_size_bytes: parse_var(&get, "MAX_UPLOAD_SIZE_BYTES", 104_857_600)?,
        })
    }
}

fn parse_var<T, G>(get: &G, key: &str, default: T) -> ServiceResult<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ServiceError::Config(format!("Invalid value for {}: '{}'", key, value))),
        None => Ok(default),
    }
}

fn parse_flag<G>(get: &G, key: &str, default: bool) -> ServiceResult<bool>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.to_ascii_lowercase()).as_deref() {
        None => Ok(default),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(ServiceError::Config(format!("Invalid value for {}: '{}'", key, other))),
    }
}

impl ApiState {
    pub async fn new(config: AppConfig) -> ServiceResult<Self> {
        let backend: Arc<dyn ObjectStore> = match &config.storage {
            StorageConfig::Local { dir, server_url } => {
                tracing::info!(dir = %dir.display(), "Using local file storage");
                Arc::new(LocalStore::new(dir.clone(), server_url.clone()))
            }
            StorageConfig::S3(settings) => {
                tracing::info!(endpoint = %settings.endpoint_url(), bucket = %settings.bucket, "Using S3 storage");
                Arc::new(S3Client::new(settings.clone()).await?)
            }
        };

        // Create the namespace up front so a misconfigured store fails at boot.
        backend.ensure_namespace().await?;

        let storage = StorageService::new(backend, config.upload_token.clone())
            .with_unique_keys(config.unique_object_keys);

        Ok(ApiState {
            storage: Arc::new(storage),
            renderer: Arc::new(InvoiceRenderer::new(PdfConfig::default())),
            config: Arc::new(config),
        })
    }
}
