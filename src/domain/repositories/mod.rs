//! Repository trait definitions for the domain layer.
//!
//! Everything the routers persist goes through the [`Storage`] trait.
//! Implementations live in `crate::infrastructure::storage`; a mock is
//! generated with `mockall` for unit tests.

pub mod storage;

pub use storage::{Storage, StorageError};

#[cfg(test)]
pub use storage::MockStorage;
