//! Request timeout middleware.

use axum::{
    BoxError,
    error_handling::HandleErrorLayer,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::time::Duration;
use tower::{ServiceBuilder, timeout::TimeoutLayer};

use super::layer::MiddlewareLayer;

/// Timeout used when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Answers `408 Request Timeout` when the wrapped routes take longer than
/// `timeout`.
///
/// The downstream future is dropped on timeout, cancelling the handler.
pub fn layer(timeout: Duration) -> MiddlewareLayer {
    MiddlewareLayer::new(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_timeout))
            .layer(TimeoutLayer::new(timeout)),
    )
}

async fn handle_timeout(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("Request timed out");
        (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response()
    } else {
        tracing::error!("Unhandled middleware error: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}
