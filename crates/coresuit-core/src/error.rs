//! Unified application error types for CoreSuit.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. The HTTP boundary is the only place
//! that turns an [`ErrorKind`] into a status code.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested entity does not exist or is hidden by soft delete.
    NotFound,
    /// A business rule rejected the input.
    Validation,
    /// A soft-delete state transition was rejected (already inactive or
    /// already active).
    Lifecycle,
    /// Structural misuse, e.g. a query against a field the entity does not have.
    InvalidOperation,
    /// The caller may not perform the action.
    Unauthorized,
    /// An argument was absent or malformed.
    InvalidArgument,
    /// A database error occurred.
    Database,
    /// The store is temporarily unavailable; the operation may be retried.
    ServiceUnavailable,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal server error occurred.
    Internal,
}

impl ErrorKind {
    /// The label reported as `errorType` in the uniform error payload.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound => "NotFound",
            Self::Validation | Self::Lifecycle => "ValidationFailure",
            Self::InvalidOperation => "InvalidOperation",
            Self::Unauthorized => "Unauthorized",
            Self::InvalidArgument => "MalformedArgument",
            Self::Database
            | Self::ServiceUnavailable
            | Self::Configuration
            | Self::Serialization
            | Self::Internal => "Unclassified",
        }
    }

    /// Whether the store may succeed if the same operation is tried again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ServiceUnavailable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Lifecycle => write!(f, "LIFECYCLE"),
            Self::InvalidOperation => write!(f, "INVALID_OPERATION"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::InvalidArgument => write!(f, "INVALID_ARGUMENT"),
            Self::Database => write!(f, "DATABASE"),
            Self::ServiceUnavailable => write!(f, "SERVICE_UNAVAILABLE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout CoreSuit.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a lifecycle (soft-delete state transition) error.
    pub fn lifecycle(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Lifecycle, message)
    }

    /// Create an invalid-operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidOperation, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a service-unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether this error may disappear on retry.
    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }

    /// The message followed by every underlying cause, joined with `" | "`.
    pub fn message_chain(&self) -> String {
        let mut messages = vec![self.message.clone()];
        let mut cause = self.source.as_deref().map(|s| s as &(dyn StdError + 'static));
        while let Some(err) = cause {
            messages.push(err.to_string());
            cause = err.source();
        }
        messages.join(" | ")
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = err
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Field '{field}' is invalid"),
                })
            })
            .collect();
        messages.sort();
        Self::validation(messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_chain_includes_sources() {
        let io = std::io::Error::other("connection reset");
        let err = AppError::with_source(ErrorKind::Database, "Failed to insert", io);
        assert_eq!(err.message_chain(), "Failed to insert | connection reset");
    }

    #[test]
    fn test_message_chain_without_source() {
        let err = AppError::not_found("Example not found");
        assert_eq!(err.message_chain(), "Example not found");
    }

    #[test]
    fn test_labels() {
        assert_eq!(ErrorKind::Validation.label(), "ValidationFailure");
        assert_eq!(ErrorKind::Lifecycle.label(), "ValidationFailure");
        assert_eq!(ErrorKind::InvalidArgument.label(), "MalformedArgument");
        assert_eq!(ErrorKind::Database.label(), "Unclassified");
    }

    #[test]
    fn test_only_unavailable_is_transient() {
        assert!(AppError::service_unavailable("pool timed out").is_transient());
        assert!(!AppError::database("syntax error").is_transient());
    }
}
