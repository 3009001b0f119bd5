//! Business rules for the Example resource.

use async_trait::async_trait;

use coresuit_core::error::AppError;
use coresuit_core::result::AppResult;
use coresuit_entity::example::Example;
use coresuit_entity::traits::SoftDelete;

use crate::crud::hooks::CrudHooks;

/// Rejects soft-delete transitions that would not change anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExampleHooks;

#[async_trait]
impl CrudHooks<Example> for ExampleHooks {
    async fn before_delete(&self, entity: &Example) -> AppResult<()> {
        if entity.is_deleted() {
            return Err(AppError::lifecycle("Record is already inactive."));
        }
        Ok(())
    }

    async fn before_activate(&self, entity: &Example) -> AppResult<()> {
        if !entity.is_deleted() {
            return Err(AppError::lifecycle("Record is already active."));
        }
        Ok(())
    }
}
