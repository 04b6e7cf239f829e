//! Handlers for the client SDK endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;

use crate::api::dto::acquisition::{
    DeployReportBody, DownloadReportBody, UpdateCheckQuery, UpdateCheckResponse,
    UpdateCheckResponseSnake, UpdateInfo,
};
use crate::error::AppError;
use crate::state::AcquisitionState;

async fn check(state: &AcquisitionState, query: UpdateCheckQuery) -> Result<UpdateInfo, AppError> {
    let deployment_key = query.deployment_key.clone();
    let result = state.service.update_check(&query.into()).await?;
    Ok(UpdateInfo::from_result(
        result,
        &deployment_key,
        &state.public_url,
    ))
}

/// `GET /updateCheck`
pub async fn update_check_handler(
    State(state): State<AcquisitionState>,
    Query(query): Query<UpdateCheckQuery>,
) -> Result<Json<UpdateCheckResponse>, AppError> {
    let update_info = check(&state, query).await?;
    Ok(Json(UpdateCheckResponse { update_info }))
}

/// `GET /v0.1/public/codepush/update_check`
pub async fn update_check_snake_handler(
    State(state): State<AcquisitionState>,
    Query(query): Query<UpdateCheckQuery>,
) -> Result<Json<UpdateCheckResponseSnake>, AppError> {
    let update_info = check(&state, query).await?;
    Ok(Json(UpdateCheckResponseSnake {
        update_info: update_info.into(),
    }))
}

/// `POST /reportStatus/deploy` and its `/v0.1` twin.
pub async fn report_deploy_handler(
    State(state): State<AcquisitionState>,
    Json(body): Json<DeployReportBody>,
) -> Result<StatusCode, AppError> {
    let deployment_key = body.deployment_key.clone();
    state
        .service
        .report_deploy(&deployment_key, body.into())
        .await?;
    Ok(StatusCode::OK)
}

/// `POST /reportStatus/download` and its `/v0.1` twin.
pub async fn report_download_handler(
    State(state): State<AcquisitionState>,
    Json(body): Json<DownloadReportBody>,
) -> Result<StatusCode, AppError> {
    state
        .service
        .report_download(&body.deployment_key, &body.label, body.client_unique_id)
        .await?;
    Ok(StatusCode::OK)
}

/// `GET /downloads/{deployment_key}/{label}` serves a release bundle.
pub async fn download_handler(
    State(state): State<AcquisitionState>,
    Path((deployment_key, label)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let blob_path = state.service.package_blob(&deployment_key, &label).await?;

    let bytes = tokio::fs::read(&blob_path).await.map_err(|e| {
        tracing::error!(path = %blob_path.display(), error = %e, "Failed to read package blob");
        AppError::internal("Package unavailable", json!({"label": label}))
    })?;

    Ok(([(header::CONTENT_TYPE, "application/zip")], bytes))
}
