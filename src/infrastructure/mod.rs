//! Infrastructure layer for external integrations.
//!
//! # Modules
//!
//! - [`storage`] - [`crate::domain::repositories::Storage`] implementations

pub mod storage;
