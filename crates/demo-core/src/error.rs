//! Error types for the demo connector.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Invalid reference: expected {expected}, got {actual}")]
    InvalidReference { expected: String, actual: String },

    #[error("Unsupported operation: {operation}")]
    UnsupportedOperation { operation: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DemoError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
        }
    }

    pub fn invalid_reference(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::InvalidReference {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

pub type DemoResult<T> = Result<T, DemoError>;
