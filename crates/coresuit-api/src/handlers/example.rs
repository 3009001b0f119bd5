//! Example-specific handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use coresuit_core::types::pagination::{PageRequest, PageResponse};
use coresuit_entity::example::ExampleSearch;
use coresuit_service::example::{ExampleDto, ExampleOperations};

use crate::error::ApiError;
use crate::extractors::ApiQuery;
use crate::handlers::crud::crud_routes;

/// GET /example/search?Name=..&Description=..
pub async fn search(
    State(service): State<Arc<dyn ExampleOperations>>,
    ApiQuery(search): ApiQuery<ExampleSearch>,
    ApiQuery(request): ApiQuery<PageRequest>,
) -> Result<Json<PageResponse<ExampleDto>>, ApiError> {
    Ok(Json(service.search(&search, &request).await?))
}

/// Routes mounted under `/example`.
pub fn routes<T>(service: Arc<dyn ExampleOperations>) -> Router<T>
where
    T: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/search", get(search))
        .with_state(service.clone())
        .merge(crud_routes(service))
}
