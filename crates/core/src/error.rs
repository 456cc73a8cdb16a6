// Central Error Type for the Client Core

use thiserror::Error;

/// Application-level error type
///
/// Cloneable so that scripted fakes can replay the same failure several times.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// The remote resource does not exist (anymore). Expected, not exceptional.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport or HTTP failure. The message is shown to the user as-is.
    #[error("{0}")]
    Remote(String),

    /// A content navigation step failed
    #[error("Resolution failure: {0}")]
    Resolution(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn remote(message: impl Into<String>) -> Self {
        AppError::Remote(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl From<crate::domain::DomainError> for AppError {
    fn from(err: crate::domain::DomainError) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}
