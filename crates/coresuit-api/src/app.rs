//! Application builder: wires stores, services, router and middleware into
//! an Axum app and serves it.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use coresuit_core::clock::{CivilClock, Clock};
use coresuit_core::config::AppConfig;
use coresuit_core::config::database::Backend;
use coresuit_core::error::AppError;
use coresuit_core::retry::RetryPolicy;
use coresuit_database::DatabasePool;
use coresuit_database::migration::run_migrations;
use coresuit_database::repositories::{ExampleRepository, MemoryRepository, PgRepository};
use coresuit_entity::example::Example;
use coresuit_service::example::{ExampleHooks, ExampleOperations, ExampleService};

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Connects the configured store and builds the services on top of it.
///
/// On PostgreSQL, pending migrations run before the state is returned.
pub async fn build_state(config: AppConfig, clock: Arc<dyn Clock>) -> Result<AppState, AppError> {
    match config.database.backend {
        Backend::Memory => {
            info!("Using the in-memory store; data is lost on exit");
            let examples = ExampleService::new(
                ExampleRepository::new(MemoryRepository::<Example>::new(clock)),
                ExampleHooks,
            );
            Ok(AppState::new(config, Arc::new(examples), None))
        }
        Backend::Postgres => {
            let pool = DatabasePool::connect(&config.database).await?;
            run_migrations(pool.pool()).await?;

            let retry = RetryPolicy::from_config(&config.database);
            let examples: Arc<dyn ExampleOperations> = Arc::new(ExampleService::new(
                ExampleRepository::new(PgRepository::<Example>::new(
                    pool.pool().clone(),
                    clock,
                    retry,
                )),
                ExampleHooks,
            ));
            Ok(AppState::new(config, examples, Some(pool)))
        }
    }
}

/// Runs the CoreSuit server until a shutdown signal arrives.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting CoreSuit v{}", env!("CARGO_PKG_VERSION"));

    let clock = CivilClock::from_config(&config.time)?;
    info!(offset = %clock.offset(), "Audit timestamps use civil time");

    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = build_state(config, Arc::new(clock)).await?;
    let database = state.database.clone();
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    info!("CoreSuit server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(pool) = database {
        if tokio::time::timeout(grace, pool.close()).await.is_err() {
            error!("Database pool did not close within the grace period");
        }
    }

    info!("CoreSuit server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
