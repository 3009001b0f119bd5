//! Generic CRUD orchestration.

pub mod hooks;
pub mod mapping;
pub mod service;

pub use hooks::{CrudHooks, NoHooks};
pub use mapping::{DtoMapping, Identified};
pub use service::{CrudOperations, CrudService};
