pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::{configure_file_route, configure_routes, json_config};
pub use state::{ApiState, AppConfig, StorageConfig};
