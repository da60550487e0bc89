pub mod api;
pub mod core;
pub mod models;
pub mod pdf;
pub mod storage;

// Re-export commonly used types
pub use crate::core::{PdfConfig, ServiceError, ServiceResult};
pub use models::{InvoiceDocument, InvoiceLineItem, InvoicePayload, StoredObject, UploadBlob};
pub use pdf::InvoiceRenderer;
pub use storage::{LocalStore, ObjectStore, S3Client, StorageService};
