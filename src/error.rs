//! Error types for the fleet engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Server already exists: {0}")]
    DuplicateId(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a duplicate identifier error
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::DuplicateId(_))
    }
}
