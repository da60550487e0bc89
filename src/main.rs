use actix_web::{middleware, web, App, HttpServer};
use anyhow::Result;
use invoice_upload_service::api::middleware::{compression, cors, security_headers};
use invoice_upload_service::api::{configure_file_route, configure_routes, json_config, ApiState, AppConfig};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    tracing::info!("Starting invoice upload service");

    prometheus::default_registry()
        .register(Box::new(prometheus::process_collector::ProcessCollector::for_self()))?;

    let config = AppConfig::from_env()?;
    let host = config.host.clone();
    let port = config.port;
    let storage_config = config.storage.clone();
    let body_limit = config.max_upload_size_bytes;

    let state = web::Data::new(ApiState::new(config).await?);

    tracing::info!("Starting server on {}:{}", host, port);

    HttpServer::new(move || {
        let storage_config = storage_config.clone();
        App::new()
            .app_data(state.clone())
            .app_data(json_config(body_limit))
            .wrap(TracingLogger::default())
            .wrap(security_headers())
            .wrap(cors())
            .wrap(compression())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_routes)
            .configure(move |cfg| configure_file_route(cfg, &storage_config))
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
