//! Route definitions for the CoreSuit HTTP API.
//!
//! Each resource is nested under its name; `/health` sits at the root.

use axum::Router;
use axum::middleware as axum_middleware;
use axum::routing::get;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the router with every route and the request logging middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/example", handlers::example::routes(state.examples.clone()))
        .route("/health", get(handlers::health::health))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}
