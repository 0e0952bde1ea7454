//! Error types reported by [`TableStore`](crate::TableStore) implementations.

/// Status codes the table service reports alongside structured errors.
pub mod status {
    /// The requested table or entity does not exist.
    pub const NOT_FOUND: u16 = 404;
    /// The resource already exists (returned by table creation).
    pub const CONFLICT: u16 = 409;
}

/// Failure returned by a table store operation.
///
/// Only [`TableError::Service`] carries a status code. Every other variant is
/// a generic failure and is treated identically by the session handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// The table service answered with an error status.
    #[error("table service error ({status}): {message}")]
    Service { status: u16, message: String },

    /// The service could not be reached or the driver failed.
    #[error("table backend error: {0}")]
    Backend(String),

    /// An entity could not be encoded or decoded.
    #[error("entity codec error: {0}")]
    Codec(String),
}

impl TableError {
    pub fn service(status: u16, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::service(status::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::service(status::CONFLICT, message)
    }

    /// Status code of a structured service error, `None` for generic failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(status::CONFLICT)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(status::NOT_FOUND)
    }
}

/// Convenience alias for table store results.
pub type Result<T> = std::result::Result<T, TableError>;

/// Classified outcome of a single store call.
///
/// The session handler folds this into the booleans and byte strings of its
/// lifecycle contract; it never leaves the crate's public handler methods.
#[derive(Debug)]
pub(crate) enum Outcome<T> {
    Found(T),
    NotFound,
    Failed(TableError),
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Outcome::Found(value),
            Err(e) if e.is_not_found() => Outcome::NotFound,
            Err(e) => Outcome::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_for_service_errors() {
        assert_eq!(TableError::conflict("exists").status(), Some(409));
        assert_eq!(TableError::Backend("refused".into()).status(), None);
        assert_eq!(TableError::Codec("bad".into()).status(), None);
    }

    #[test]
    fn test_outcome_classification() {
        let found: Outcome<u8> = Ok(1).into();
        assert!(matches!(found, Outcome::Found(1)));

        let missing: Outcome<u8> = Err(TableError::not_found("gone")).into();
        assert!(matches!(missing, Outcome::NotFound));

        let forbidden: Outcome<u8> = Err(TableError::service(403, "denied")).into();
        assert!(matches!(forbidden, Outcome::Failed(TableError::Service { status: 403, .. })));
    }
}
