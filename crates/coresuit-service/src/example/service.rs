//! Example service.

use async_trait::async_trait;

use coresuit_core::result::AppResult;
use coresuit_core::types::pagination::{PageRequest, PageResponse};
use coresuit_database::repositories::example::ExampleRepository;
use coresuit_entity::example::{Example, ExampleSearch};
use coresuit_entity::repository::CrudRepository;

use crate::crud::hooks::CrudHooks;
use crate::crud::mapping::DtoMapping;
use crate::crud::service::{CrudOperations, CrudService};

use super::dto::{CreateExampleDto, ExampleDto, UpdateExampleDto};
use super::hooks::ExampleHooks;

/// Example CRUD plus search.
#[async_trait]
pub trait ExampleOperations:
    CrudOperations<Dto = ExampleDto, CreateDto = CreateExampleDto, UpdateDto = UpdateExampleDto>
{
    /// One page of non-deleted examples matching the search terms.
    async fn search(
        &self,
        search: &ExampleSearch,
        request: &PageRequest,
    ) -> AppResult<PageResponse<ExampleDto>>;
}

/// The Example service over a given store.
pub type ExampleService<R, H = ExampleHooks> = CrudService<Example, ExampleRepository<R>, H>;

#[async_trait]
impl<R, H> ExampleOperations for CrudService<Example, ExampleRepository<R>, H>
where
    R: CrudRepository<Example>,
    H: CrudHooks<Example>,
{
    async fn search(
        &self,
        search: &ExampleSearch,
        request: &PageRequest,
    ) -> AppResult<PageResponse<ExampleDto>> {
        let page = self.repository().search(search, request).await?;
        Ok(page.map(|example| example.to_dto()))
    }
}
