//! HTTP middleware for request processing and protection.
//!
//! Every factory returns a [`MiddlewareLayer`] except [`tracing::layer`],
//! which hands back `tower-http`'s `TraceLayer`.

pub mod auth;
pub mod file_upload;
pub mod headers;
pub mod layer;
pub mod sanitizer;
pub mod telemetry;
pub mod timeout;
pub mod tracing;

pub use auth::{AuthenticatedAccount, Authentication, AuthenticationConfig, ProviderRedirects};
pub use file_upload::{
    FileUploadGuard, UploadError, UploadedFile, UploadedFiles, create_temp_file_from_buffer,
    get_file_with_field,
};
pub use headers::HeadersConfig;
pub use layer::MiddlewareLayer;
pub use telemetry::{AppInsights, Telemetry, TelemetryConfig, TelemetrySnapshot};
