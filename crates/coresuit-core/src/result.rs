//! Convenience result type alias for CoreSuit.

use crate::error::AppError;

/// A specialized `Result` type for CoreSuit operations.
pub type AppResult<T> = Result<T, AppError>;

/// Turns an absent lookup result into a [`ErrorKind::NotFound`](crate::error::ErrorKind::NotFound) error.
pub trait OrNotFound<T> {
    /// Fail with `"{entity} not found"` when the value is absent.
    fn or_not_found(self, entity: &str) -> AppResult<T>;
}

impl<T> OrNotFound<T> for Option<T> {
    fn or_not_found(self, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::not_found(format!("{entity} not found")))
    }
}
