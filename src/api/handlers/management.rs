//! Handlers for the management API.
//!
//! Every handler takes [`AuthenticatedAccount`], so routes answer 401 when
//! mounted without [`crate::api::middleware::Authentication::authenticate`].

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use crate::api::dto::management::{
    AccountResponse, AppEnvelope, AppsResponse, CreateAppRequest, DeploymentsResponse,
    PackageInfo, ReleaseResponse,
};
use crate::api::middleware::{
    AuthenticatedAccount, UploadedFiles, create_temp_file_from_buffer, get_file_with_field,
};
use crate::domain::entities::NewPackage;
use crate::error::AppError;
use crate::state::ManagementState;

/// File field carrying the release bundle.
pub const PACKAGE_FIELD: &str = "package";
/// Text field carrying [`PackageInfo`] as JSON.
pub const PACKAGE_INFO_FIELD: &str = "packageInfo";

/// `GET /account`
pub async fn account_handler(
    AuthenticatedAccount(account): AuthenticatedAccount,
) -> Json<AccountResponse> {
    Json(AccountResponse { account })
}

/// `GET /apps`
pub async fn list_apps_handler(
    State(state): State<ManagementState>,
    AuthenticatedAccount(account): AuthenticatedAccount,
) -> Result<Json<AppsResponse>, AppError> {
    let apps = state.service.list_apps(&account).await?;
    Ok(Json(AppsResponse {
        apps: apps.into_iter().map(Into::into).collect(),
    }))
}

/// `POST /apps`
///
/// # Response Codes
///
/// - **201 Created**: App created with `Staging` and `Production` deployments
/// - **400 Bad Request**: Invalid app name
/// - **409 Conflict**: The account already has an app with that name
pub async fn create_app_handler(
    State(state): State<ManagementState>,
    AuthenticatedAccount(account): AuthenticatedAccount,
    Json(payload): Json<CreateAppRequest>,
) -> Result<(StatusCode, Json<AppEnvelope>), AppError> {
    let app = state.service.create_app(&account, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(AppEnvelope { app: app.into() })))
}

/// `GET /apps/{app}/deployments`
pub async fn list_deployments_handler(
    State(state): State<ManagementState>,
    AuthenticatedAccount(account): AuthenticatedAccount,
    Path(app_name): Path<String>,
) -> Result<Json<DeploymentsResponse>, AppError> {
    let deployments = state.service.list_deployments(&account, &app_name).await?;
    Ok(Json(DeploymentsResponse {
        deployments: deployments.into_iter().map(Into::into).collect(),
    }))
}

/// `POST /apps/{app}/deployments/{deployment}/release`
///
/// Expects a multipart body with a `package` file and a `packageInfo` JSON
/// field. The bundle is written to a temp file and its SHA-256 becomes the
/// package hash.
///
/// # Response Codes
///
/// - **201 Created**: Release committed
/// - **400 Bad Request**: Missing `package` or invalid `packageInfo`
/// - **404 Not Found**: Unknown app or deployment
/// - **413 Payload Too Large**: Bundle exceeds the upload size limit
pub async fn release_handler(
    State(state): State<ManagementState>,
    AuthenticatedAccount(account): AuthenticatedAccount,
    Path((app_name, deployment_name)): Path<(String, String)>,
    Extension(files): Extension<UploadedFiles>,
) -> Result<(StatusCode, Json<ReleaseResponse>), AppError> {
    let file = get_file_with_field(&files, PACKAGE_FIELD).ok_or_else(|| {
        AppError::bad_request(
            "A package file is required",
            json!({"field": PACKAGE_FIELD}),
        )
    })?;

    let info = parse_package_info(files.field(PACKAGE_INFO_FIELD))?;

    let size = file.size as u64;
    let buffer = file.buffer.clone();
    let (blob_path, package_hash) = tokio::task::spawn_blocking(move || {
        let path = create_temp_file_from_buffer(&buffer)?;
        Ok::<(PathBuf, String), std::io::Error>((path, hex::encode(Sha256::digest(&buffer))))
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Package write task failed");
        AppError::internal("Failed to store package", json!({}))
    })?
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to write package to temp file");
        AppError::internal("Failed to store package", json!({}))
    })?;

    let package = NewPackage {
        app_version: info.app_version,
        description: info.description,
        is_mandatory: info.is_mandatory,
        package_hash,
        blob_path: blob_path.clone(),
        size,
    };

    match state
        .service
        .release(&account, &app_name, &deployment_name, package)
        .await
    {
        Ok(package) => Ok((
            StatusCode::CREATED,
            Json(ReleaseResponse {
                package: package.into(),
            }),
        )),
        Err(e) => {
            if let Err(io) = tokio::fs::remove_file(&blob_path).await {
                tracing::warn!(
                    path = %blob_path.display(),
                    error = %io,
                    "Failed to remove orphaned package"
                );
            }
            Err(e)
        }
    }
}

fn parse_package_info(raw: Option<&str>) -> Result<PackageInfo, AppError> {
    let raw = raw.ok_or_else(|| {
        AppError::bad_request(
            "packageInfo is required",
            json!({"field": PACKAGE_INFO_FIELD}),
        )
    })?;

    serde_json::from_str(raw).map_err(|e| {
        AppError::bad_request(
            "Invalid packageInfo",
            json!({"field": PACKAGE_INFO_FIELD, "reason": e.to_string()}),
        )
    })
}
