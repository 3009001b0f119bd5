//! Generic CRUD handlers, shared by every resource.
//!
//! | Method | Path    | Status |
//! |--------|---------|--------|
//! | GET    | `/`     | 200    |
//! | GET    | `/{id}` | 200    |
//! | POST   | `/`     | 201    |
//! | PUT    | `/`     | 200    |
//! | DELETE | `/{id}` | 200    |
//! | PATCH  | `/{id}` | 200    |
//!
//! The update payload carries the id; it is not part of the URL.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use coresuit_core::types::pagination::{PageRequest, PageResponse};
use coresuit_service::crud::CrudOperations;

use crate::error::ApiError;
use crate::extractors::{ApiJson, ApiPath, ApiQuery};

/// GET /
pub async fn list<S>(
    State(service): State<Arc<S>>,
    ApiQuery(request): ApiQuery<PageRequest>,
) -> Result<Json<PageResponse<S::Dto>>, ApiError>
where
    S: CrudOperations + ?Sized,
{
    Ok(Json(service.get_all(&request).await?))
}

/// GET /{id}
pub async fn get_by_id<S>(
    State(service): State<Arc<S>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<S::Dto>, ApiError>
where
    S: CrudOperations + ?Sized,
{
    Ok(Json(service.get_by_id(id).await?))
}

/// POST /
pub async fn create<S>(
    State(service): State<Arc<S>>,
    ApiJson(dto): ApiJson<S::CreateDto>,
) -> Result<(StatusCode, Json<S::Dto>), ApiError>
where
    S: CrudOperations + ?Sized,
{
    let created = service.create(dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /
pub async fn update<S>(
    State(service): State<Arc<S>>,
    ApiJson(dto): ApiJson<S::UpdateDto>,
) -> Result<Json<S::Dto>, ApiError>
where
    S: CrudOperations + ?Sized,
{
    Ok(Json(service.update(dto).await?))
}

/// DELETE /{id}
pub async fn delete<S>(
    State(service): State<Arc<S>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<S::Dto>, ApiError>
where
    S: CrudOperations + ?Sized,
{
    Ok(Json(service.delete(id).await?))
}

/// PATCH /{id}
pub async fn activate<S>(
    State(service): State<Arc<S>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<S::Dto>, ApiError>
where
    S: CrudOperations + ?Sized,
{
    Ok(Json(service.activate(id).await?))
}

/// The six CRUD routes over one service, ready to be nested under the
/// resource name.
pub fn crud_routes<S, T>(service: Arc<S>) -> Router<T>
where
    S: CrudOperations + ?Sized,
    T: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list::<S>).post(create::<S>).put(update::<S>))
        .route(
            "/{id}",
            get(get_by_id::<S>)
                .delete(delete::<S>)
                .patch(activate::<S>),
        )
        .with_state(service)
}
