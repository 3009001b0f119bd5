//! Repository implementations.

pub mod example;
pub mod memory;
pub mod postgres;

pub use example::ExampleRepository;
pub use memory::MemoryRepository;
pub use postgres::PgRepository;
