//! Database-specific error types and conversions.

use demo_core::error::DemoError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

impl DbError {
    pub(crate) fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<DbError> for DemoError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => DemoError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => DemoError::AlreadyExists { entity },
            DbError::Hash(msg) => DemoError::Crypto(msg),
            other => DemoError::Database(other.to_string()),
        }
    }
}
