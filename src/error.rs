//! Error taxonomy shared by every layer of the tool.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Empty required field, negative quantity or price.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A referenced row does not exist (client for an invoice, invoice for
    /// a line item).
    #[error("Reference error: {0}")]
    ReferenceError(anyhow::Error),

    /// Duplicate invoice number. The sequence counter makes this
    /// unreachable in practice, but the store rejects it rather than
    /// overwrite.
    #[error("Conflict: {0}")]
    Conflict(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    /// PDF construction or save failure.
    #[error("Render error: {0}")]
    RenderError(anyhow::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    InternalError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}
