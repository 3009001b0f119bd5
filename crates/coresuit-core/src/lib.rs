//! # coresuit-core
//!
//! Cross-cutting crate for CoreSuit. Contains the unified error system,
//! configuration schemas, pagination/sorting/filter types, the civil-time
//! [`Clock`](clock::Clock) and the store [`RetryPolicy`](retry::RetryPolicy).
//!
//! This crate has **no** internal dependencies on other CoreSuit crates.

pub mod clock;
pub mod config;
pub mod error;
pub mod result;
pub mod retry;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::{AppResult, OrNotFound};
