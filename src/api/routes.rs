//! Route tables for the router factories in [`crate::api`].

use axum::{
    Router,
    routing::{get, post},
};
use std::convert::Infallible;

use crate::api::handlers::{
    account_handler, create_app_handler, download_handler, health_handler, list_apps_handler,
    list_deployments_handler, release_handler, report_deploy_handler, report_download_handler,
    update_check_handler, update_check_snake_handler,
};
use crate::api::middleware::MiddlewareLayer;
use crate::state::{AcquisitionState, HealthState, ManagementState};

/// Client SDK routes.
///
/// # Endpoints
///
/// - `GET  /updateCheck`                                   - camelCase update check
/// - `GET  /v0.1/public/codepush/update_check`             - snake_case update check
/// - `POST /reportStatus/deploy`                           - Install outcome
/// - `POST /v0.1/public/codepush/report_status/deploy`
/// - `POST /reportStatus/download`                         - Bundle downloaded
/// - `POST /v0.1/public/codepush/report_status/download`
/// - `GET  /downloads/{deployment_key}/{label}`            - Release bundle
pub fn acquisition_routes() -> Router<AcquisitionState> {
    Router::new()
        .route("/updateCheck", get(update_check_handler))
        .route(
            "/v0.1/public/codepush/update_check",
            get(update_check_snake_handler),
        )
        .route("/reportStatus/deploy", post(report_deploy_handler))
        .route(
            "/v0.1/public/codepush/report_status/deploy",
            post(report_deploy_handler),
        )
        .route("/reportStatus/download", post(report_download_handler))
        .route(
            "/v0.1/public/codepush/report_status/download",
            post(report_download_handler),
        )
        .route("/downloads/{deployment_key}/{label}", get(download_handler))
}

pub fn health_routes() -> Router<HealthState> {
    Router::new().route("/health", get(health_handler))
}

/// Management routes. Handlers require an authenticated account.
///
/// # Endpoints
///
/// - `GET  /account`
/// - `GET  /apps`
/// - `POST /apps`
/// - `GET  /apps/{app}/deployments`
/// - `POST /apps/{app}/deployments/{deployment}/release`  - multipart upload
///
/// The release route runs behind `upload_guard`.
pub fn management_routes(upload_guard: MiddlewareLayer) -> Router<ManagementState> {
    Router::new()
        .route("/account", get(account_handler))
        .route("/apps", get(list_apps_handler).post(create_app_handler))
        .route("/apps/{app}/deployments", get(list_deployments_handler))
        .route(
            "/apps/{app}/deployments/{deployment}/release",
            post(release_handler).layer::<_, Infallible>(upload_guard),
        )
}
