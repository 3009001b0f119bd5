//! Example resource services.

pub mod dto;
pub mod hooks;
pub mod service;

pub use dto::{CreateExampleDto, ExampleDto, UpdateExampleDto};
pub use hooks::ExampleHooks;
pub use service::{ExampleOperations, ExampleService};
