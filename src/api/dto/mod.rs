//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization.

pub mod acquisition;
pub mod auth;
pub mod health;
pub mod management;
