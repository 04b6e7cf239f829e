//! Update checks and client status reports.

use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::entities::{DeploymentStatus, Package, StatusReport};
use crate::domain::repositories::Storage;
use crate::error::AppError;

/// Parameters of an update check, independent of the wire casing.
#[derive(Debug, Clone, Default)]
pub struct UpdateCheckRequest {
    pub deployment_key: String,
    pub app_version: String,
    pub package_hash: Option<String>,
    pub label: Option<String>,
    pub client_unique_id: Option<String>,
}

/// Outcome of an update check.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCheckResult {
    pub is_available: bool,
    /// The client runs a binary the latest release does not target.
    pub update_app_version: bool,
    /// Binary version the (possibly unavailable) release targets.
    pub app_version: String,
    pub package: Option<Package>,
}

impl UpdateCheckResult {
    fn unavailable(app_version: String) -> Self {
        Self {
            is_available: false,
            update_app_version: false,
            app_version,
            package: None,
        }
    }
}

/// Deploy report fields as sent by client SDKs.
#[derive(Debug, Clone, Default)]
pub struct DeployReport {
    pub label: Option<String>,
    pub app_version: String,
    pub status: Option<DeploymentStatus>,
    pub client_unique_id: Option<String>,
    pub previous_label_or_app_version: Option<String>,
}

/// Service answering client SDK requests.
pub struct AcquisitionService {
    storage: Arc<dyn Storage>,
}

impl AcquisitionService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Decides whether the latest release of a deployment should be installed.
    ///
    /// # Rules
    ///
    /// 1. No release yet: not available
    /// 2. Latest release targets another binary version: not available,
    ///    `update_app_version` set
    /// 3. Client already runs the latest package hash: not available
    /// 4. Otherwise the latest release is available
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the deployment key or app version is empty.
    /// Returns [`AppError::NotFound`] if the deployment key is unknown.
    pub async fn update_check(
        &self,
        request: &UpdateCheckRequest,
    ) -> Result<UpdateCheckResult, AppError> {
        if request.deployment_key.is_empty() || request.app_version.is_empty() {
            return Err(AppError::bad_request(
                "deploymentKey and appVersion are required",
                json!({}),
            ));
        }

        let deployment = self
            .storage
            .deployment_by_key(&request.deployment_key)
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    "Deployment not found",
                    json!({"deploymentKey": request.deployment_key}),
                )
            })?;

        let Some(latest) = deployment.latest_package() else {
            return Ok(UpdateCheckResult::unavailable(request.app_version.clone()));
        };

        if latest.app_version != request.app_version {
            return Ok(UpdateCheckResult {
                is_available: false,
                update_app_version: true,
                app_version: latest.app_version.clone(),
                package: None,
            });
        }

        if request.package_hash.as_deref() == Some(latest.package_hash.as_str()) {
            return Ok(UpdateCheckResult::unavailable(request.app_version.clone()));
        }

        tracing::debug!(
            deployment = %deployment.name,
            label = %latest.label,
            "Update available"
        );

        Ok(UpdateCheckResult {
            is_available: true,
            update_app_version: false,
            app_version: latest.app_version.clone(),
            package: Some(latest.clone()),
        })
    }

    /// Records an install outcome reported by a client.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the deployment key is empty and
    /// [`AppError::NotFound`] if it is unknown.
    pub async fn report_deploy(
        &self,
        deployment_key: &str,
        report: DeployReport,
    ) -> Result<(), AppError> {
        if deployment_key.is_empty() || report.app_version.is_empty() {
            return Err(AppError::bad_request(
                "deploymentKey and appVersion are required",
                json!({}),
            ));
        }

        let report = StatusReport::Deploy {
            label: report.label,
            app_version: report.app_version,
            status: report.status,
            client_unique_id: report.client_unique_id,
            previous_label_or_app_version: report.previous_label_or_app_version,
        };
        self.storage.record_status(deployment_key, report).await?;
        Ok(())
    }

    /// Records a package download reported by a client.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the key or label is empty and
    /// [`AppError::NotFound`] if the key is unknown.
    pub async fn report_download(
        &self,
        deployment_key: &str,
        label: &str,
        client_unique_id: Option<String>,
    ) -> Result<(), AppError> {
        if deployment_key.is_empty() || label.is_empty() {
            return Err(AppError::bad_request(
                "deploymentKey and label are required",
                json!({}),
            ));
        }

        let report = StatusReport::Download {
            label: label.to_string(),
            client_unique_id,
        };
        self.storage.record_status(deployment_key, report).await?;
        Ok(())
    }

    /// Returns where the bundle of a release was stored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the deployment or label is unknown.
    pub async fn package_blob(
        &self,
        deployment_key: &str,
        label: &str,
    ) -> Result<PathBuf, AppError> {
        let deployment = self.storage.deployment_by_key(deployment_key).await?;

        deployment
            .as_ref()
            .and_then(|d| d.package_history.iter().find(|p| p.label == label))
            .map(|p| p.blob_path.clone())
            .ok_or_else(|| AppError::not_found("Package not found", json!({"label": label})))
    }
}
