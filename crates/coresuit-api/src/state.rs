//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use coresuit_core::config::AppConfig;
use coresuit_database::DatabasePool;
use coresuit_service::example::ExampleOperations;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Validated configuration.
    pub config: Arc<AppConfig>,
    /// Example resource service.
    pub examples: Arc<dyn ExampleOperations>,
    /// PostgreSQL pool; `None` on the in-memory backend.
    pub database: Option<DatabasePool>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        examples: Arc<dyn ExampleOperations>,
        database: Option<DatabasePool>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            examples,
            database,
        }
    }
}
