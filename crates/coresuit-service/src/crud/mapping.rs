//! Entity ↔ DTO conversions.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde::de::DeserializeOwned;
use validator::Validate;

use coresuit_entity::traits::Entity;

/// A request payload that names the record it targets.
pub trait Identified {
    /// Identity of the target record.
    fn id(&self) -> i64;
}

/// The DTO shapes of an entity and the conversions between them.
pub trait DtoMapping: Entity {
    /// Shape returned to clients.
    type Dto: Serialize + Send + Sync + 'static;
    /// Payload accepted on create.
    type CreateDto: DeserializeOwned + Validate + Send + Sync + 'static;
    /// Payload accepted on update.
    type UpdateDto: DeserializeOwned + Validate + Identified + Send + Sync + 'static;

    /// Project the entity for a client.
    fn to_dto(&self) -> Self::Dto;

    /// Build an unsaved entity stamped at `now`.
    fn from_create(dto: Self::CreateDto, now: NaiveDateTime) -> Self;

    /// Copy the client-writable fields onto the entity. Audit stamps are
    /// left alone.
    fn apply_update(&mut self, dto: Self::UpdateDto);
}
