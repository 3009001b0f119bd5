//! Generic CRUD service.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;
use validator::Validate;

use coresuit_core::result::{AppResult, OrNotFound};
use coresuit_core::types::pagination::{PageRequest, PageResponse};
use coresuit_entity::query::QueryOptions;
use coresuit_entity::repository::CrudRepository;
use coresuit_entity::traits::{Audited, SoftDelete};

use super::hooks::{CrudHooks, NoHooks};
use super::mapping::{DtoMapping, Identified};

/// The CRUD verbs exposed over HTTP, in DTO terms.
#[async_trait]
pub trait CrudOperations: Send + Sync + 'static {
    type Dto: Serialize + Send + 'static;
    type CreateDto: DeserializeOwned + Send + 'static;
    type UpdateDto: DeserializeOwned + Send + 'static;

    /// One page of non-deleted records.
    async fn get_all(&self, request: &PageRequest) -> AppResult<PageResponse<Self::Dto>>;

    /// A single record, soft-deleted or not.
    async fn get_by_id(&self, id: i64) -> AppResult<Self::Dto>;

    async fn create(&self, dto: Self::CreateDto) -> AppResult<Self::Dto>;

    /// Overwrite the record named by the payload's id.
    async fn update(&self, dto: Self::UpdateDto) -> AppResult<Self::Dto>;

    /// Soft delete.
    async fn delete(&self, id: i64) -> AppResult<Self::Dto>;

    /// Undo a soft delete.
    async fn activate(&self, id: i64) -> AppResult<Self::Dto>;
}

/// Runs validation, hooks, mapping and persistence for each CRUD verb of
/// one entity type.
pub struct CrudService<E, R, H = NoHooks> {
    repository: R,
    hooks: H,
    _entity: PhantomData<fn() -> E>,
}

impl<E, R, H> CrudService<E, R, H>
where
    E: DtoMapping + Audited + SoftDelete,
    R: CrudRepository<E>,
    H: CrudHooks<E>,
{
    /// Creates a service over a repository with the given hooks.
    pub fn new(repository: R, hooks: H) -> Self {
        Self {
            repository,
            hooks,
            _entity: PhantomData,
        }
    }

    /// The underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    async fn load(&self, id: i64, check_deleted_at: bool) -> AppResult<E> {
        self.repository
            .get(id, check_deleted_at)
            .await?
            .or_not_found(E::NAME)
    }
}

impl<E, R> CrudService<E, R, NoHooks>
where
    E: DtoMapping + Audited + SoftDelete,
    R: CrudRepository<E>,
{
    /// Creates a service with no hooks.
    pub fn without_hooks(repository: R) -> Self {
        Self::new(repository, NoHooks)
    }
}

#[async_trait]
impl<E, R, H> CrudOperations for CrudService<E, R, H>
where
    E: DtoMapping + Audited + SoftDelete,
    R: CrudRepository<E>,
    H: CrudHooks<E>,
{
    type Dto = E::Dto;
    type CreateDto = E::CreateDto;
    type UpdateDto = E::UpdateDto;

    async fn get_all(&self, request: &PageRequest) -> AppResult<PageResponse<E::Dto>> {
        let query = self.repository.all(QueryOptions::new())?;
        let page = self
            .repository
            .apply_pagination_and_ordering(query, request)
            .await?;
        Ok(page.map(|entity| entity.to_dto()))
    }

    async fn get_by_id(&self, id: i64) -> AppResult<E::Dto> {
        let entity = self
            .repository
            .get_with_relations(id)
            .await?
            .or_not_found(E::NAME)?;
        self.hooks.after_get(&entity).await?;
        Ok(entity.to_dto())
    }

    async fn create(&self, dto: E::CreateDto) -> AppResult<E::Dto> {
        dto.validate()?;
        self.hooks.before_create(&dto).await?;

        let entity = E::from_create(dto, self.repository.now());
        let created = self.repository.add(entity).await?;
        info!(entity = E::NAME, id = created.id(), "Record created");

        self.hooks.after_create(&created).await?;
        Ok(created.to_dto())
    }

    async fn update(&self, dto: E::UpdateDto) -> AppResult<E::Dto> {
        dto.validate()?;
        let mut entity = self.load(dto.id(), true).await?;
        self.hooks.before_update(&dto, &entity).await?;

        entity.apply_update(dto);
        entity.set_updated_at(self.repository.now());
        let updated = self.repository.update(entity).await?;
        info!(entity = E::NAME, id = updated.id(), "Record updated");

        self.hooks.after_update(&updated).await?;
        Ok(updated.to_dto())
    }

    async fn delete(&self, id: i64) -> AppResult<E::Dto> {
        let mut entity = self.load(id, false).await?;
        self.hooks.before_delete(&entity).await?;

        entity.set_deleted_at(Some(self.repository.now()));
        let deleted = self.repository.update(entity).await?;
        info!(entity = E::NAME, id, "Record deactivated");

        self.hooks.after_delete(&deleted).await?;
        Ok(deleted.to_dto())
    }

    async fn activate(&self, id: i64) -> AppResult<E::Dto> {
        let mut entity = self.load(id, false).await?;
        self.hooks.before_activate(&entity).await?;

        entity.set_deleted_at(None);
        let activated = self.repository.update(entity).await?;
        info!(entity = E::NAME, id, "Record activated");

        self.hooks.after_activate(&activated).await?;
        Ok(activated.to_dto())
    }
}
