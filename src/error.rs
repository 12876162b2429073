use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The report artifact could not be read back or written in place.
    /// Fatal for the run; nothing is left half-written.
    #[error("Failed to persist report artifact at {}: {message}", path.display())]
    Persistence { path: PathBuf, message: String },

    #[error("Notification failed: {0}")]
    Notify(String),

    #[error("Metrics recorder error: {0}")]
    Metrics(String),
}

impl ScraperError {
    pub fn persistence(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        ScraperError::Persistence {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;
