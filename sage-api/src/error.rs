use thiserror::Error;

#[derive(Error, Debug)]
pub enum SageError {
    /// Missing or malformed client input
    #[error("{0}")]
    Validation(String),

    /// The hosted auth provider refused the request (bad credentials, duplicate sign-up)
    #[error("{0}")]
    AuthRejected(String),

    /// Any other downstream failure (data store, billing, auth transport)
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for SageError {
    fn from(e: config::ConfigError) -> Self {
        SageError::Config(e.to_string())
    }
}

impl SageError {
    /// True for errors caused by the caller rather than a dependency
    pub fn is_client_error(&self) -> bool {
        matches!(self, SageError::Validation(_) | SageError::AuthRejected(_))
    }
}

pub type Result<T> = std::result::Result<T, SageError>;
