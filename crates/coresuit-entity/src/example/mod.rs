//! Example domain entities.

pub mod model;
pub mod search;

pub use model::Example;
pub use search::ExampleSearch;
