/// Error types shared by the storage and service layers
///
/// Storage implementations report [`StoreError`]; services wrap it in
/// [`ServiceError`] next to the domain outcomes (currently only "not found")
/// that the HTTP layer maps to status codes.
use std::fmt;

/// Resource kinds that can be reported as missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Project,
    Task,
    User,
    Session,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Project => "Project",
            Resource::Task => "Task",
            Resource::User => "User",
            Resource::Session => "Session",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by a storage backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Unique constraint violation: {0}")]
    Conflict(String),

    /// A foreign key pointed at a row that no longer exists
    #[error("Referenced row is missing: {0}")]
    MissingReference(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            if db_err.is_unique_violation() {
                return StoreError::Conflict(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::MissingReference(constraint);
            }
        }
        StoreError::Database(err)
    }
}

/// Errors returned by the resource services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The addressed entity (or the entity it references) does not exist
    #[error("{0} not found")]
    NotFound(Resource),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Service result type alias
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            ServiceError::NotFound(Resource::Project).to_string(),
            "Project not found"
        );
        assert_eq!(
            ServiceError::NotFound(Resource::Task).to_string(),
            "Task not found"
        );
    }

    #[test]
    fn test_row_not_found_is_database_error() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }
}
