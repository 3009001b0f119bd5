//! # coresuit-database
//!
//! PostgreSQL connection management, migrations and the repository
//! implementations behind the generic
//! [`CrudRepository`](coresuit_entity::CrudRepository) port.

pub mod connection;
pub mod error;
pub mod migration;
pub mod repositories;
pub mod sql;

pub use connection::DatabasePool;
pub use repositories::{ExampleRepository, MemoryRepository, PgRepository};
