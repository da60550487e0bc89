use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::core::{ServiceError, ServiceResult};

/// Bytes plus the metadata needed to store them.
#[derive(Debug, Clone)]
pub struct UploadBlob {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
    /// Size announced by the client, when it sent one.
    pub declared_size: Option<u64>,
}

impl UploadBlob {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        UploadBlob {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
            declared_size: None,
        }
    }

    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.declared_size = Some(size);
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn validate(&self) -> ServiceResult<()> {
        match self.declared_size {
            Some(declared) if declared != self.data.len() as u64 => Err(ServiceError::Validation(format!(
                "Declared size {} does not match received {} bytes",
                declared,
                self.data.len()
            ))),
            _ => Ok(()),
        }
    }
}

/// Descriptor of a blob persisted by an object store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub url: String,
    pub object_key: String,
    pub namespace: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(flatten)]
    pub object: StoredObject,
}

impl From<StoredObject> for UploadResponse {
    fn from(object: StoredObject) -> Self {
        UploadResponse { success: true, object }
    }
}
