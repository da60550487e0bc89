use actix_files::Files;
use actix_web::{error, web, HttpRequest};

use super::error::ApiError;
use super::handlers;
use super::metrics::metrics_endpoint;
use super::state::StorageConfig;
use crate::storage::local::FILES_ROUTE;

fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    ApiError::from(err).into()
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health checks
        .route("/health", web::get().to(handlers::health_check))
        .route("/metrics", web::get().to(metrics_endpoint))

        .service(
            web::scope("/api")
                .route("/upload", web::post().to(handlers::upload_file))
                .route("/generate-invoice", web::post().to(handlers::generate_invoice)),
        );
}

/// JSON extractor settings: body limit and JSON-shaped errors.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(json_error_handler)
}

/// Serve stored files back when they live on local disk.
pub fn configure_file_route(cfg: &mut web::ServiceConfig, storage: &StorageConfig) {
    if let StorageConfig::Local { dir, .. } = storage {
        cfg.service(Files::new(FILES_ROUTE, dir.clone()));
    }
}
