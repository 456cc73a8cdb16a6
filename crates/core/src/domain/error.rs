// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown node kind: {0}")]
    UnknownNodeKind(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

pub type Result<T> = std::result::Result<T, DomainError>;
