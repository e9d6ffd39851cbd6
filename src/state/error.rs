use thiserror::Error;

use crate::core::errors::{ConfigError, UpstreamServiceError};
use crate::documents::DataFormatError;
use crate::ingest::IngestionError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build service client: {0}")]
    Client(#[source] UpstreamServiceError),

    #[error("Failed to load review data: {0}")]
    Data(#[from] DataFormatError),

    #[error("Failed to ingest reviews: {0}")]
    Ingestion(#[from] IngestionError),

    #[error("Failed to register metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}
