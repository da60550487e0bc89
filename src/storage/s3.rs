use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use super::ObjectStore;
use crate::core::{ServiceError, ServiceResult};
use crate::models::UploadBlob;

/// Connection settings for an S3-compatible store such as MinIO.
#[derive(Debug, Clone, PartialEq)]
pub struct S3Settings {
    pub endpoint: String,
    pub port: u16,
    pub use_ssl: bool,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub bucket: String,
    pub region: String,
    /// Host used in returned URLs when the caller does not supply one.
    pub public_host: Option<String>,
}

impl S3Settings {
    fn scheme(&self) -> &'static str {
        if self.use_ssl {
            "https"
        } else {
            "http"
        }
    }

    pub fn endpoint_url(&self) -> String {
        format!("{}://{}:{}", self.scheme(), self.endpoint, self.port)
    }
}

/// `<scheme>://<host>[:<port>]/<bucket>/<key>`.
///
/// The port is left out when it is the scheme default or when `host`
/// already names one.
pub fn public_object_url(use_ssl: bool, host: &str, port: u16, bucket: &str, key: &str) -> String {
    let scheme = if use_ssl { "https" } else { "http" };
    let host = host.trim_end_matches('/');
    if host.contains(':') || port == 80 || port == 443 {
        format!("{}://{}/{}/{}", scheme, host, bucket, key)
    } else {
        format!("{}://{}:{}/{}/{}", scheme, host, port, bucket, key)
    }
}

pub struct S3Client {
    client: Client,
    settings: S3Settings,
}

impl S3Client {
    pub async fn new(settings: S3Settings) -> ServiceResult<Self> {
        let client = match (&settings.access_key, &settings.secret_key) {
            (Some(access_key), Some(secret_key)) => {
                let credentials = Credentials::new(
                    access_key.clone(),
                    secret_key.clone(),
                    None,
                    None,
                    "static",
                );
                let config = aws_sdk_s3::Config::builder()
                    .behavior_version(BehaviorVersion::latest())
                    .region(Region::new(settings.region.clone()))
                    .endpoint_url(settings.endpoint_url())
                    .credentials_provider(credentials)
                    .force_path_style(true)
                    .build();
                Client::from_conf(config)
            }
            (None, None) => {
                // Fall back to the usual AWS provider chain (env, profile, IMDS).
                let shared = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(settings.region.clone()))
                    .load()
                    .await;
                let config = aws_sdk_s3::config::Builder::from(&shared)
                    .endpoint_url(settings.endpoint_url())
                    .force_path_style(true)
                    .build();
                Client::from_conf(config)
            }
            _ => {
                return Err(ServiceError::Config(
                    "MINIO_ACCESS_KEY and MINIO_SECRET_KEY must be set together".to_string(),
                ))
            }
        };

        Ok(S3Client { client, settings })
    }

    pub fn settings(&self) -> &S3Settings {
        &self.settings
    }

    fn object_url(&self, key: &str, public_host: Option<&str>) -> String {
        let host = public_host
            .or(self.settings.public_host.as_deref())
            .unwrap_or(&self.settings.endpoint);
        public_object_url(self.settings.use_ssl, host, self.settings.port, &self.settings.bucket, key)
    }

    async fn create_bucket(&self) -> ServiceResult<()> {
        match self.client.create_bucket().bucket(&self.settings.bucket).send().await {
            Ok(_) => {
                tracing::info!(bucket = %self.settings.bucket, "Created bucket");
                Ok(())
            }
            Err(err) => match err.as_service_error() {
                // Another request created it between our check and create.
                Some(e) if e.is_bucket_already_owned_by_you() || e.is_bucket_already_exists() => Ok(()),
                _ => Err(ServiceError::Storage(format!(
                    "Failed to create bucket {}: {}",
                    self.settings.bucket,
                    DisplayErrorContext(&err)
                ))),
            },
        }
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    fn namespace(&self) -> &str {
        &self.settings.bucket
    }

    async fn ensure_namespace(&self) -> ServiceResult<()> {
        match self.client.head_bucket().bucket(&self.settings.bucket).send().await {
            Ok(_) => Ok(()),
            Err(err) if err.as_service_error().map(|e| e.is_not_found()).unwrap_or(false) => {
                self.create_bucket().await
            }
            Err(err) => Err(ServiceError::Storage(format!(
                "Failed to check bucket {}: {}",
                self.settings.bucket,
                DisplayErrorContext(&err)
            ))),
        }
    }

    async fn put(&self, key: &str, blob: &UploadBlob, public_host: Option<&str>) -> ServiceResult<String> {
        self.client
            .put_object()
            .bucket(&self.settings.bucket)
            .key(key)
            .body(ByteStream::from(blob.data.clone()))
            .content_type(&blob.content_type)
            .content_length(blob.len() as i64)
            .send()
            .await
            .map_err(|err| ServiceError::Storage(format!("Failed to upload {}: {}", key, DisplayErrorContext(&err))))?;

        Ok(self.object_url(key, public_host))
    }
}
