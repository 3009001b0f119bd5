//! Mapping of sqlx errors into [`AppError`].

use coresuit_core::error::{AppError, ErrorKind};

/// SQLSTATE codes that signal a retryable conflict.
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const NOT_NULL_VIOLATION: &str = "23502";

/// Convert a sqlx error raised while performing `context`.
///
/// Connection-level failures and serialization conflicts become
/// [`ErrorKind::ServiceUnavailable`] so the retry policy picks them up.
pub fn map_sqlx_error(context: &str, err: sqlx::Error) -> AppError {
    let kind = classify(&err);
    AppError::with_source(kind, context.to_string(), err)
}

fn classify(err: &sqlx::Error) -> ErrorKind {
    match err {
        sqlx::Error::RowNotFound => ErrorKind::NotFound,
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => ErrorKind::ServiceUnavailable,
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED) => ErrorKind::ServiceUnavailable,
            Some(UNIQUE_VIOLATION | FOREIGN_KEY_VIOLATION) => ErrorKind::Validation,
            Some(NOT_NULL_VIOLATION) => ErrorKind::InvalidArgument,
            _ => ErrorKind::Database,
        },
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => ErrorKind::Serialization,
        _ => ErrorKind::Database,
    }
}
