//! Route handlers.

pub mod crud;
pub mod example;
pub mod health;
