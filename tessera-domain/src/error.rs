//! Domain errors

use thiserror::Error;

/// Domain validation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Expected version cannot be applied to the target stream
    #[error("Invalid expected version: {0}")]
    InvalidExpectedVersion(String),

    /// Stream name is missing or blank
    #[error("Incorrect stream data: {0}")]
    IncorrectStreamData(String),

    /// Page size (limit or batch size) must be at least 1
    #[error("Invalid page size: {0}")]
    InvalidPageSize(String),

    /// Record could not be converted to or from its storage form
    #[error("Serialization error: {0}")]
    Serialization(String),
}
