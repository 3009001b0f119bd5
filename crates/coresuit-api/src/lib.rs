//! # coresuit-api
//!
//! HTTP API layer for CoreSuit built on Axum.
//!
//! Provides the generic CRUD endpoints, the Example search and health
//! endpoints, request logging, CORS, extractors and error mapping.

pub mod app;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use error::{ApiError, ErrorResponse};
pub use state::AppState;
