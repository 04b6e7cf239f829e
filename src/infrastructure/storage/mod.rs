//! Storage backends.
//!
//! - [`InMemoryStorage`] - process-local store used for development and tests

mod memory;

pub use memory::InMemoryStorage;
