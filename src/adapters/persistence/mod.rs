use sqlx::PgPool;

use crate::app_error::AppError;

pub mod payment_record;

#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    AppError::StoreConflict
                } else if db_err.is_check_violation() {
                    AppError::ValidationFailure(db_err.message().to_string())
                } else {
                    // Log the actual error for debugging, but don't expose details
                    tracing::error!(error = ?err, "Database error");
                    AppError::Internal("Database operation failed".into())
                }
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::WorkerCrashed => {
                tracing::error!(error = %err, "Database unreachable");
                AppError::StoreUnavailable(err.to_string())
            }
            _ => {
                tracing::error!(error = ?err, "Database error");
                AppError::Internal("Database operation failed".into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            AppError::from(sqlx::Error::RowNotFound),
            AppError::NotFound
        ));
    }

    #[test]
    fn pool_exhaustion_is_retryable() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::StoreUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn io_failure_is_retryable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(AppError::from(sqlx::Error::Io(io)).is_retryable());
    }

    #[test]
    fn decode_errors_are_not_retryable() {
        let err = AppError::from(sqlx::Error::ColumnNotFound("status".into()));
        assert!(matches!(err, AppError::Internal(_)));
    }
}
