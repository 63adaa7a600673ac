//! Database-specific error types and conversions.

use brigade_core::error::BrigadeError;
use tracing::error;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Stored record could not be decoded: {0}")]
    Decode(String),

    #[error("Record already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    /// Classify an error reported by `Response::check` for a statement
    /// writing `entity`. Unique index violations become
    /// [`DbError::AlreadyExists`].
    pub(crate) fn statement(entity: &str, err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if message.contains("already contains") || message.contains("already exists") {
            DbError::AlreadyExists {
                entity: entity.into(),
            }
        } else {
            DbError::Query(message)
        }
    }

    pub(crate) fn not_found(entity: &str, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<DbError> for BrigadeError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => BrigadeError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => BrigadeError::AlreadyExists { entity },
            other => {
                error!(error = %other, "Database operation failed");
                BrigadeError::Database(other.to_string())
            }
        }
    }
}
