use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Row numbers are 1-based, got {0}")]
    InvalidRowNumber(u32),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AuditError {
    fn from(e: serde_json::Error) -> Self {
        AuditError::Serialize(e.to_string())
    }
}
