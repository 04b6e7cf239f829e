//! # CodePush Server
//!
//! Middleware and router factories for a CodePush-style update server,
//! built with Axum.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Accounts, apps, deployments, packages and the storage trait
//! - **Application Layer** ([`application`]) - Update checks, management and authentication logic
//! - **Infrastructure Layer** ([`infrastructure`]) - Storage implementations
//! - **API Layer** ([`api`]) - Middleware and router factories, handlers and DTOs
//!
//! ## Factories
//!
//! | Factory | Returns |
//! |---|---|
//! | [`api::headers`] | CORS and security headers layer |
//! | [`api::acquisition`] | Client SDK router |
//! | [`api::health`] | Health check router |
//! | [`api::management`] | Management router |
//! | [`api::auth`] | [`api::Authentication`] (`router`, `legacy_router`, `authenticate`) |
//! | [`api::app_insights`] | [`api::AppInsights`] (`request_tracker`, `error_handler`) |
//! | [`api::input_sanitizer`] | Sanitizing layer |
//! | [`api::request_timeout_handler`] | Timeout layer |
//! | [`api::file_upload_middleware`] | Multipart size guard |
//!
//! ## Quick Start
//!
//! ```bash
//! export ACCESS_KEY_SIGNING_SECRET="change-me"
//! export SEED_ACCESS_KEY="my-access-key"   # Optional
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::api::{AcquisitionConfig, AuthenticationConfig, ManagementConfig};
    pub use crate::application::services::{AcquisitionService, AuthService, ManagementService};
    pub use crate::domain::entities::{Account, App, Deployment, Package};
    pub use crate::domain::repositories::{Storage, StorageError};
    pub use crate::error::AppError;
    pub use crate::infrastructure::storage::InMemoryStorage;
}
