use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrmError {
    /// Rejected locally, before anything was sent to the record service.
    #[error("{0}")]
    Validation(String),

    /// The record service rejected the call.
    #[error("{0}")]
    Service(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

impl CrmError {
    /// The human readable part of the error, as shown in a notification body.
    pub fn message(&self) -> String {
        match self {
            CrmError::Validation(msg) | CrmError::Service(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CrmError>;
