//! Example DTOs and their mapping.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use coresuit_entity::example::Example;

use crate::crud::mapping::{DtoMapping, Identified};

/// Example as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

/// Request body for creating an example.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExampleDto {
    #[serde(default, alias = "Name")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default, alias = "Description")]
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

/// Request body for updating an example. The id travels in the body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExampleDto {
    #[serde(alias = "Id")]
    pub id: i64,
    #[serde(default, alias = "Name")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default, alias = "Description")]
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

impl Identified for UpdateExampleDto {
    fn id(&self) -> i64 {
        self.id
    }
}

impl DtoMapping for Example {
    type Dto = ExampleDto;
    type CreateDto = CreateExampleDto;
    type UpdateDto = UpdateExampleDto;

    fn to_dto(&self) -> ExampleDto {
        ExampleDto {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
            deleted_at: self.deleted_at,
            updated_at: self.updated_at,
        }
    }

    fn from_create(dto: CreateExampleDto, now: NaiveDateTime) -> Self {
        Example::new(dto.name, dto.description, now)
    }

    fn apply_update(&mut self, dto: UpdateExampleDto) {
        self.name = dto.name;
        self.description = dto.description;
    }
}
