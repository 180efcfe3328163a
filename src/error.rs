//! # Error Handling
//!
//! Error taxonomy shared by the repositories, procedures and seeds. Driver
//! errors are classified from the database error code so callers can tell
//! a duplicate row from a missing parent or a rejected enum value.

use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

/// Errors returned by repository and procedure functions
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Input rejected before reaching the database
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Unique key or index violated
    #[error("conflict: {0}")]
    Conflict(String),

    /// Foreign key violated
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// CHECK constraint violated
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("database error: {0}")]
    Database(#[source] DbErr),

    #[error("failed to hash password: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
}

impl RepositoryError {
    pub fn validation_error(message: impl Into<String>) -> Self {
        RepositoryError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        RepositoryError::NotFound(message.into())
    }

    /// Classify a SeaORM error into the matching variant.
    pub fn database_error(error: DbErr) -> Self {
        match error.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => {
                tracing::debug!(%message, "Unique constraint violation detected");
                return RepositoryError::Conflict(message);
            }
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => {
                tracing::debug!(%message, "Foreign key violation detected");
                return RepositoryError::MissingReference(message);
            }
            _ => {}
        }

        if is_check_violation(&error) {
            tracing::debug!(?error, "Check constraint violation detected");
            return RepositoryError::ConstraintViolation(error.to_string());
        }

        match error {
            DbErr::RecordNotFound(record) => RepositoryError::NotFound(record),
            other => {
                tracing::error!(error = ?other, "Database error");
                RepositoryError::Database(other)
            }
        }
    }

    /// Whether the error was caused by the caller rather than the database
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            RepositoryError::Database(_) | RepositoryError::PasswordHash(_)
        )
    }
}

impl From<DbErr> for RepositoryError {
    fn from(error: DbErr) -> Self {
        RepositoryError::database_error(error)
    }
}

fn is_check_violation(error: &DbErr) -> bool {
    const PG_CHECK: &str = "23514";
    // SQLITE_CONSTRAINT_CHECK
    const SQLITE_CHECK: &str = "275";

    let runtime_err = match error {
        DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err,
        _ => return false,
    };

    let Some(db_error) = runtime_err.as_database_error() else {
        return false;
    };

    if db_error.is_check_violation() {
        return true;
    }

    match db_error.code().as_deref() {
        Some(PG_CHECK | SQLITE_CHECK) => true,
        Some(_) => false,
        None => db_error.message().contains("CHECK constraint failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_not_found_maps_to_not_found() {
        let error = RepositoryError::database_error(DbErr::RecordNotFound("camera cam9".into()));
        assert!(matches!(error, RepositoryError::NotFound(ref message) if message == "camera cam9"));
        assert!(error.is_client_error());
    }

    #[test]
    fn connection_errors_stay_database_errors() {
        let error = RepositoryError::from(DbErr::Conn(RuntimeErr::Internal("refused".into())));
        assert!(matches!(error, RepositoryError::Database(_)));
        assert!(!error.is_client_error());
    }

    #[test]
    fn messages_name_the_failure() {
        let error = RepositoryError::validation_error("username must not be empty");
        assert_eq!(
            error.to_string(),
            "validation failed: username must not be empty"
        );
        assert_eq!(
            RepositoryError::not_found("user u1").to_string(),
            "not found: user u1"
        );
    }
}
