//! HTTP adapter errors

use mbyte_core::domain::DomainError;
use mbyte_core::AppError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HttpError>;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx answer
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HttpError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, HttpError::Status { code: 404, .. })
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            HttpError::Decode(e.to_string())
        } else {
            HttpError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(e: serde_json::Error) -> Self {
        HttpError::Decode(e.to_string())
    }
}

impl From<DomainError> for HttpError {
    fn from(e: DomainError) -> Self {
        HttpError::Decode(e.to_string())
    }
}

impl From<config::ConfigError> for HttpError {
    fn from(e: config::ConfigError) -> Self {
        HttpError::Config(e.to_string())
    }
}

/// 404 becomes NotFound, every other status keeps the `HTTP <code>: <body>` message
impl From<HttpError> for AppError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Status { code: 404, body } => AppError::NotFound(body),
            HttpError::Status { .. } => AppError::Remote(e.to_string()),
            HttpError::Transport(message) => AppError::Remote(message),
            HttpError::Decode(message) => AppError::Decode(message),
            HttpError::InvalidUrl(message) | HttpError::Config(message) => {
                AppError::Config(message)
            }
        }
    }
}
