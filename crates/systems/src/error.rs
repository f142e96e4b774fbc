use thiserror::Error;

pub type Result<T> = std::result::Result<T, SystemsError>;

#[derive(Error, Debug)]
pub enum SystemsError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid scan input: {0}")]
    InvalidInput(String),

    #[error("Invalid cluster policy: {0}")]
    InvalidPolicy(String),
}
