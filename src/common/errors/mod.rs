use std::path::PathBuf;

use uuid::Uuid;

/// Raised while building a probe request. Transport and HTTP status failures
/// are never errors; they are reported through `ProbeOutcome`.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Invalid target url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Invalid value for header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },
    #[error("Could not serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Could not read payload file {path:?}: {source}")]
    PayloadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    InvalidPayload(#[from] SchemaViolationError),
    #[error("Could not build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
#[error("Payload does not match schema: {message}")]
pub struct SchemaViolationError {
    pub message: String,
}

impl SchemaViolationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Delivery {0} not found")]
    DeliveryNotFound(Uuid),
}
