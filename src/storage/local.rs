use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::ObjectStore;
use crate::core::ServiceResult;
use crate::models::UploadBlob;

/// Route under which stored files are served back.
pub const FILES_ROUTE: &str = "/files";

/// Stores blobs as files in one directory, served from [`FILES_ROUTE`].
pub struct LocalStore {
    root: PathBuf,
    namespace: String,
    server_url: String,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>, server_url: impl Into<String>) -> Self {
        let root = root.into();
        let namespace = root.display().to_string();
        let server_url = server_url.into().trim_end_matches('/').to_string();
        LocalStore {
            root,
            namespace,
            server_url,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}{}/{}", self.server_url, FILES_ROUTE, key)
    }
}

async fn write_durably(partial: &Path, data: &[u8], path: &Path) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(partial).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    tokio::fs::rename(partial, path).await
}

#[async_trait]
impl ObjectStore for LocalStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn ensure_namespace(&self) -> ServiceResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    async fn put(&self, key: &str, blob: &UploadBlob, _public_host: Option<&str>) -> ServiceResult<String> {
        let path = self.root.join(key);
        // Hidden sibling so a failed write never shows up under `key`.
        let partial = self.root.join(format!(".{}.{}.part", key, Uuid::new_v4().simple()));

        if let Err(e) = write_durably(&partial, &blob.data, &path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                tracing::debug!(path = %partial.display(), "No partial file to remove: {}", cleanup);
            }
            return Err(e.into());
        }

        tracing::debug!(path = %path.display(), "Wrote file");
        Ok(self.public_url(key))
    }
}
