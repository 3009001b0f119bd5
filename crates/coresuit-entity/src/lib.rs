//! # coresuit-entity
//!
//! Domain layer for CoreSuit: the entity contracts, column whitelists,
//! table definitions, declarative queries and the generic
//! [`CrudRepository`](repository::CrudRepository) port, plus the
//! [`Example`](example::Example) entity.

pub mod column;
pub mod example;
pub mod query;
pub mod repository;
pub mod table;
pub mod traits;

pub use column::{Column, ColumnKind, ColumnValue};
pub use query::{Condition, Operand, OrderBy, Query, QueryOptions};
pub use repository::CrudRepository;
pub use table::{TableInfo, tables};
pub use traits::{Audited, Entity, HasActiveFlag, HasBranch, SoftDelete};
