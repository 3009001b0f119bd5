//! Core type definitions used across the CoreSuit workspace.

pub mod filter;
pub mod pagination;
pub mod sorting;

pub use filter::{FilterField, FilterOp, FilterValue};
pub use pagination::{PageRequest, PageRequestParams, PageResponse};
pub use sorting::SortDirection;
