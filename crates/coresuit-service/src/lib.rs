//! # coresuit-service
//!
//! Business logic service layer for CoreSuit. [`CrudService`] sequences
//! validation, hooks, mapping and persistence for every CRUD verb; the
//! [`example`] module wires it up for the `Example` resource.
//!
//! Services follow constructor injection: the repository and hook
//! strategy are provided at construction time.

pub mod crud;
pub mod example;

pub use crud::{CrudHooks, CrudOperations, CrudService, DtoMapping, Identified, NoHooks};
pub use example::{ExampleHooks, ExampleOperations, ExampleService};
