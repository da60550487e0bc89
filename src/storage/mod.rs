pub mod local;
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::core::{ServiceError, ServiceResult};
use crate::models::{StoredObject, UploadBlob};

pub use local::LocalStore;
pub use s3::S3Client;

/// A place blobs can be written to and served back from.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket or directory name reported back to clients.
    fn namespace(&self) -> &str;

    /// Make sure the namespace exists. Must succeed if it already does.
    async fn ensure_namespace(&self) -> ServiceResult<()>;

    /// Write `blob` under `key` and return its public URL.
    ///
    /// `public_host` overrides the configured host in the URL for backends
    /// that build absolute URLs from a host name.
    async fn put(&self, key: &str, blob: &UploadBlob, public_host: Option<&str>) -> ServiceResult<String>;
}

/// Reduce a client-supplied filename to something safe for keys and paths.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `<millis>-<filename>`, or `<millis>-<8 hex>-<filename>` when `unique` is set.
///
/// Without the random part two uploads of the same name within one
/// millisecond get the same key and the later one wins.
pub fn object_key(file_name: &str, unique: bool) -> String {
    let millis = Utc::now().timestamp_millis();
    let name = sanitize_file_name(file_name);
    if unique {
        let tag = Uuid::new_v4().simple().to_string();
        format!("{}-{}-{}", millis, &tag[..8], name)
    } else {
        format!("{}-{}", millis, name)
    }
}

/// Token-checked front door to an [`ObjectStore`].
pub struct StorageService {
    backend: Arc<dyn ObjectStore>,
    upload_token: String,
    unique_keys: bool,
}

impl StorageService {
    pub fn new(backend: Arc<dyn ObjectStore>, upload_token: impl Into<String>) -> Self {
        StorageService {
            backend,
            upload_token: upload_token.into(),
            unique_keys: false,
        }
    }

    pub fn with_unique_keys(mut self, unique: bool) -> Self {
        self.unique_keys = unique;
        self
    }

    pub fn namespace(&self) -> &str {
        self.backend.namespace()
    }

    /// The token this service accepts; used by internal callers that upload
    /// on their own behalf.
    pub(crate) fn server_token(&self) -> &str {
        &self.upload_token
    }

    pub async fn store(&self, blob: &UploadBlob, token: &str, public_host: Option<&str>) -> ServiceResult<StoredObject> {
        if token != self.upload_token {
            return Err(ServiceError::Auth("Invalid upload token".to_string()));
        }
        blob.validate()?;

        self.backend.ensure_namespace().await?;

        let key = object_key(&blob.file_name, self.unique_keys);
        let url = self.backend.put(&key, blob, public_host).await?;

        tracing::info!(
            object_key = %key,
            namespace = self.backend.namespace(),
            size = blob.len(),
            content_type = %blob.content_type,
            "Stored object"
        );

        Ok(StoredObject {
            url,
            object_key: key,
            namespace: self.backend.namespace().to_string(),
        })
    }
}
