//! DTOs for the management API.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Account, App, Deployment, Package};

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub account: Account,
}

#[derive(Debug, Deserialize)]
pub struct CreateAppRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AppsResponse {
    pub apps: Vec<AppResponse>,
}

#[derive(Debug, Serialize)]
pub struct AppEnvelope {
    pub app: AppResponse,
}

#[derive(Debug, Serialize)]
pub struct AppResponse {
    pub name: String,
    pub deployments: Vec<String>,
}

impl From<App> for AppResponse {
    fn from(app: App) -> Self {
        Self {
            name: app.name,
            deployments: app.deployments.into_iter().map(|d| d.name).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeploymentsResponse {
    pub deployments: Vec<DeploymentResponse>,
}

#[derive(Debug, Serialize)]
pub struct DeploymentResponse {
    pub name: String,
    pub key: String,
    pub package: Option<PackageResponse>,
}

impl From<Deployment> for DeploymentResponse {
    fn from(mut d: Deployment) -> Self {
        Self {
            package: d.package_history.pop().map(PackageResponse::from),
            name: d.name,
            key: d.key,
        }
    }
}

/// JSON carried in the `packageInfo` field of a release upload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    pub app_version: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_mandatory: bool,
}

#[derive(Debug, Serialize)]
pub struct ReleaseResponse {
    pub package: PackageResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageResponse {
    pub label: String,
    pub app_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_mandatory: bool,
    pub package_hash: String,
    pub size: u64,
    /// Milliseconds since the Unix epoch.
    pub upload_time: i64,
}

impl From<Package> for PackageResponse {
    fn from(p: Package) -> Self {
        Self {
            label: p.label,
            app_version: p.app_version,
            description: p.description,
            is_mandatory: p.is_mandatory,
            package_hash: p.package_hash,
            size: p.size,
            upload_time: p.upload_time.timestamp_millis(),
        }
    }
}
