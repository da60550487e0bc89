use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Auth(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Generation error: {0}")]
    Generation(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ServiceError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ServiceError::Auth(_))
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(error: std::io::Error) -> Self {
        ServiceError::Storage(error.to_string())
    }
}

impl From<lopdf::Error> for ServiceError {
    fn from(error: lopdf::Error) -> Self {
        ServiceError::Generation(error.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
