//! HTTP surface: middleware and router factories.
//!
//! Each factory takes a typed options value and returns either a
//! [`MiddlewareLayer`] or an axum [`Router`]. Factories are independent and
//! can be composed in any order; see [`crate::routes::app_router`].
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Middleware implementations
//! - [`routes`] - Route tables

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

use axum::{Router, middleware::from_fn};
use std::{sync::Arc, time::Duration};

use crate::application::services::{AcquisitionService, ManagementService};
use crate::domain::repositories::Storage;
use crate::state::{AcquisitionState, HealthState, ManagementState};

pub use middleware::{
    AppInsights, AuthenticatedAccount, Authentication, AuthenticationConfig, FileUploadGuard,
    HeadersConfig, MiddlewareLayer, TelemetryConfig, UploadedFile, UploadedFiles,
    create_temp_file_from_buffer, get_file_with_field,
};

/// Options for [`acquisition`] and [`health`].
#[derive(Clone)]
pub struct AcquisitionConfig {
    pub storage: Arc<dyn Storage>,
    /// Base URL clients use to download release bundles.
    pub public_url: String,
}

/// Options for [`management`].
#[derive(Clone)]
pub struct ManagementConfig {
    pub storage: Arc<dyn Storage>,
    /// Largest accepted release bundle, in megabytes.
    pub upload_size_limit_mb: u64,
}

/// CORS and security response headers.
pub fn headers(config: HeadersConfig) -> MiddlewareLayer {
    middleware::headers::layer(config)
}

/// Routes used by client SDKs to check for and report on updates.
pub fn acquisition(config: &AcquisitionConfig) -> Router {
    let state = AcquisitionState {
        service: Arc::new(AcquisitionService::new(config.storage.clone())),
        public_url: Arc::from(config.public_url.as_str()),
    };
    routes::acquisition_routes().with_state(state)
}

/// `GET /health` backed by the storage health check.
pub fn health(config: &AcquisitionConfig) -> Router {
    routes::health_routes().with_state(HealthState {
        storage: config.storage.clone(),
    })
}

/// Routes for managing apps, deployments and releases.
///
/// Mount behind [`Authentication::authenticate`]; handlers answer 401 otherwise.
pub fn management(config: &ManagementConfig) -> Router {
    let state = ManagementState {
        service: Arc::new(ManagementService::new(config.storage.clone())),
    };
    routes::management_routes(file_upload_middleware(config.upload_size_limit_mb)).with_state(state)
}

/// Shared authentication instance exposing `router()`, `legacy_router()`
/// and `authenticate()`.
pub fn auth(config: AuthenticationConfig) -> Authentication {
    Authentication::new(config)
}

/// Request and exception tracking.
pub fn app_insights(config: &TelemetryConfig) -> AppInsights {
    AppInsights::new(config)
}

pub fn input_sanitizer() -> MiddlewareLayer {
    MiddlewareLayer::new(from_fn(middleware::sanitizer::layer))
}

/// Answers 408 when the wrapped routes take longer than `timeout`.
pub fn request_timeout_handler(timeout: Duration) -> MiddlewareLayer {
    middleware::timeout::layer(timeout)
}

/// Multipart guard rejecting any part larger than `limit_mb` megabytes with 413.
///
/// Lifts axum's default body limit for the routes it wraps.
pub fn file_upload_middleware(limit_mb: u64) -> MiddlewareLayer {
    FileUploadGuard::new(limit_mb).into_layer()
}
