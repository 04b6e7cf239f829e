//! Top-level router composing every factory in [`crate::api`].
//!
//! # Route Structure
//!
//! - `GET  /health`                 - Storage health check (public)
//! - `/updateCheck`, `/reportStatus/*`, `/v0.1/public/codepush/*`,
//!   `/downloads/*`                 - Client SDK routes (public)
//! - `/auth/*`, `/authenticated`    - Auth routes
//! - `/account`, `/apps/*`          - Management API (Bearer access key required)
//!
//! # Middleware (outermost first)
//!
//! - **Tracing** - Structured request/response logging
//! - **Request tracker** - Request telemetry
//! - **Headers** - CORS and security headers, preflight answers
//! - **Timeout** - 408 after the configured duration
//! - **Input sanitizer** - Trims query and JSON string values
//! - **Error handler** - Records 5xx responses as exceptions
//! - **Path normalization** - Trailing slash handling

use axum::Router;
use std::sync::Arc;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api::{
    self, AcquisitionConfig, AuthenticationConfig, HeadersConfig, ManagementConfig,
    TelemetryConfig, middleware::tracing,
};
use crate::config::Config;
use crate::domain::repositories::Storage;

/// Constructs the application router with all routes and middleware.
pub fn app_router(config: &Config, storage: Arc<dyn Storage>) -> NormalizePath<Router> {
    let acquisition_config = AcquisitionConfig {
        storage: storage.clone(),
        public_url: config.public_url.clone(),
    };
    let management_config = ManagementConfig {
        storage: storage.clone(),
        upload_size_limit_mb: config.upload_size_limit_mb,
    };

    let auth = api::auth(AuthenticationConfig {
        storage,
        signing_secret: config.access_key_signing_secret.clone(),
        providers: config.auth_providers.clone(),
        default_provider: config.auth_default_provider.clone(),
    });

    let insights = api::app_insights(&TelemetryConfig {
        instrumentation_key: config.instrumentation_key.clone(),
    });

    let headers = api::headers(HeadersConfig {
        allowed_origin: config.cors_allowed_origin.clone(),
        cli_version: config.cli_version.clone(),
        ..Default::default()
    });

    let management = api::management(&management_config).route_layer(auth.authenticate());

    let router = Router::new()
        .merge(api::health(&acquisition_config))
        .merge(api::acquisition(&acquisition_config))
        .merge(auth.router())
        .merge(auth.legacy_router())
        .merge(management)
        .layer(insights.error_handler())
        .layer(api::input_sanitizer())
        .layer(api::request_timeout_handler(config.request_timeout()))
        .layer(headers)
        .layer(insights.request_tracker())
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
