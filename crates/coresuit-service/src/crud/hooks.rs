//! Extension points around the CRUD verbs.

use async_trait::async_trait;

use coresuit_core::result::AppResult;

use super::mapping::DtoMapping;

/// Checks run before and after each CRUD step.
///
/// Every hook defaults to doing nothing. An error from a `before_*` hook
/// aborts the operation before anything is written; an error from an
/// `after_*` hook is reported to the caller but the write stands.
#[async_trait]
pub trait CrudHooks<E: DtoMapping>: Send + Sync + 'static {
    async fn before_create(&self, _dto: &E::CreateDto) -> AppResult<()> {
        Ok(())
    }

    async fn after_create(&self, _entity: &E) -> AppResult<()> {
        Ok(())
    }

    /// Runs with the stored entity, before the payload is applied.
    async fn before_update(&self, _dto: &E::UpdateDto, _entity: &E) -> AppResult<()> {
        Ok(())
    }

    async fn after_update(&self, _entity: &E) -> AppResult<()> {
        Ok(())
    }

    async fn before_delete(&self, _entity: &E) -> AppResult<()> {
        Ok(())
    }

    async fn after_delete(&self, _entity: &E) -> AppResult<()> {
        Ok(())
    }

    async fn before_activate(&self, _entity: &E) -> AppResult<()> {
        Ok(())
    }

    async fn after_activate(&self, _entity: &E) -> AppResult<()> {
        Ok(())
    }

    /// Runs after a single entity is loaded for a client.
    async fn after_get(&self, _entity: &E) -> AppResult<()> {
        Ok(())
    }
}

/// Hooks that accept everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl<E: DtoMapping> CrudHooks<E> for NoHooks {}
