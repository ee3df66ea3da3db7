use thiserror::Error;

/// Store failures, classified so callers can separate retryable
/// serialization aborts from terminal faults.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("serialization conflict: {0}")]
    Serialization(#[source] sqlx::Error),

    #[error("unique constraint violated: {0}")]
    UniqueViolation(#[source] sqlx::Error),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    /// True when the failure is a serialization abort that a fresh attempt
    /// of the same transaction may resolve.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Serialization(_))
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(code) = db_err.code() {
                if retryable_code(code.as_ref()) {
                    return StoreError::Serialization(err);
                }
            }
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation(err);
            }
        }
        StoreError::Database(err)
    }
}

/// SQLSTATE codes PostgreSQL raises for aborts that succeed on retry:
/// 40001 serialization_failure and 40P01 deadlock_detected.
pub fn retryable_code(code: &str) -> bool {
    code == "40001" || code == "40P01"
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::fmt;

    /// A driver-level error carrying a chosen SQLSTATE, standing in for what
    /// PostgreSQL reports.
    #[derive(Debug)]
    struct StubDatabaseError {
        code: &'static str,
    }

    impl fmt::Display for StubDatabaseError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "SQLSTATE {}", self.code)
        }
    }

    impl std::error::Error for StubDatabaseError {}

    impl DatabaseError for StubDatabaseError {
        fn message(&self) -> &str {
            "stubbed database failure"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn kind(&self) -> ErrorKind {
            if self.code == "23505" {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::Other
            }
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    fn database_error(code: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(StubDatabaseError { code }))
    }

    #[test]
    fn test_retryable_codes() {
        assert!(retryable_code("40001"));
        assert!(retryable_code("40P01"));
        assert!(!retryable_code("23505"));
        assert!(!retryable_code("42601"));
        assert!(!retryable_code(""));
    }

    #[test]
    fn test_unique_violation_is_classified() {
        let err = StoreError::from(database_error("23505"));
        assert!(err.is_unique_violation());
        assert!(!err.is_conflict());
        assert!(matches!(err, StoreError::UniqueViolation(_)));
    }

    #[test]
    fn test_serialization_codes_are_conflicts() {
        let err = StoreError::from(database_error("40001"));
        assert!(err.is_conflict());
        assert!(matches!(err, StoreError::Serialization(_)));

        let deadlock = StoreError::from(database_error("40P01"));
        assert!(deadlock.is_conflict());
    }

    #[test]
    fn test_other_database_codes_are_terminal() {
        // 23503 foreign_key_violation: a database error, but neither
        // retryable nor a unique violation.
        let err = StoreError::from(database_error("23503"));
        assert!(!err.is_conflict());
        assert!(!err.is_unique_violation());
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_non_database_errors_are_terminal() {
        let err = StoreError::from(sqlx::Error::PoolClosed);
        assert!(!err.is_conflict());
        assert!(!err.is_unique_violation());
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_row_not_found_is_terminal() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(!err.is_conflict());
        assert!(matches!(err, StoreError::Database(_)));
    }
}
