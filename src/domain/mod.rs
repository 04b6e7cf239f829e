//! Domain layer containing release entities and the storage contract.
//!
//! # Architecture
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Data access trait definitions
//!
//! The domain layer has no dependencies on the HTTP or infrastructure layers.

pub mod entities;
pub mod repositories;
