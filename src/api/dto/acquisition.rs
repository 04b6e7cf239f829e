//! DTOs for the client SDK endpoints.
//!
//! Older SDKs call `/updateCheck` with camelCase fields, newer ones call
//! `/v0.1/public/codepush/update_check` with snake_case fields. Request DTOs
//! accept both spellings; responses come in one shape per route.

use serde::{Deserialize, Serialize};

use crate::application::services::{DeployReport, UpdateCheckRequest, UpdateCheckResult};
use crate::domain::entities::DeploymentStatus;

/// Query parameters of an update check.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCheckQuery {
    #[serde(default, alias = "deployment_key")]
    pub deployment_key: String,
    #[serde(default, alias = "app_version")]
    pub app_version: String,
    #[serde(alias = "package_hash")]
    pub package_hash: Option<String>,
    pub label: Option<String>,
    #[serde(alias = "client_unique_id")]
    pub client_unique_id: Option<String>,
}

impl From<UpdateCheckQuery> for UpdateCheckRequest {
    fn from(q: UpdateCheckQuery) -> Self {
        Self {
            deployment_key: q.deployment_key,
            app_version: q.app_version,
            package_hash: q.package_hash.filter(|h| !h.is_empty()),
            label: q.label,
            client_unique_id: q.client_unique_id,
        }
    }
}

/// Update check answer for `/updateCheck`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCheckResponse {
    pub update_info: UpdateInfo,
}

/// Update check answer for `/v0.1/public/codepush/update_check`.
#[derive(Debug, Serialize)]
pub struct UpdateCheckResponseSnake {
    pub update_info: UpdateInfoSnake,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInfo {
    #[serde(rename = "downloadURL", skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_available: bool,
    pub is_mandatory: bool,
    pub app_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_size: Option<u64>,
    pub update_app_version: bool,
    pub should_run_binary_version: bool,
}

impl UpdateInfo {
    /// Builds the answer; `download_base` is prefixed to the package download path.
    pub fn from_result(
        result: UpdateCheckResult,
        deployment_key: &str,
        download_base: &str,
    ) -> Self {
        let UpdateCheckResult {
            is_available,
            update_app_version,
            app_version,
            package,
        } = result;

        match package {
            Some(p) => Self {
                download_url: Some(format!(
                    "{}/downloads/{}/{}",
                    download_base.trim_end_matches('/'),
                    deployment_key,
                    p.label
                )),
                description: p.description,
                is_available,
                is_mandatory: p.is_mandatory,
                app_version,
                package_hash: Some(p.package_hash),
                label: Some(p.label),
                package_size: Some(p.size),
                update_app_version,
                should_run_binary_version: false,
            },
            None => Self {
                is_available,
                app_version,
                update_app_version,
                should_run_binary_version: update_app_version,
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateInfoSnake {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_available: bool,
    pub is_mandatory: bool,
    pub target_binary_range: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_size: Option<u64>,
    pub update_app_version: bool,
    pub should_run_binary_version: bool,
}

impl From<UpdateInfo> for UpdateInfoSnake {
    fn from(info: UpdateInfo) -> Self {
        Self {
            download_url: info.download_url,
            description: info.description,
            is_available: info.is_available,
            is_mandatory: info.is_mandatory,
            target_binary_range: info.app_version,
            package_hash: info.package_hash,
            label: info.label,
            package_size: info.package_size,
            update_app_version: info.update_app_version,
            should_run_binary_version: info.should_run_binary_version,
        }
    }
}

/// Body of a deploy status report.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployReportBody {
    #[serde(default, alias = "deployment_key")]
    pub deployment_key: String,
    pub label: Option<String>,
    #[serde(default, alias = "app_version")]
    pub app_version: String,
    pub status: Option<DeploymentStatus>,
    #[serde(alias = "client_unique_id")]
    pub client_unique_id: Option<String>,
    #[serde(alias = "previous_label_or_app_version")]
    pub previous_label_or_app_version: Option<String>,
}

impl From<DeployReportBody> for DeployReport {
    fn from(b: DeployReportBody) -> Self {
        Self {
            label: b.label,
            app_version: b.app_version,
            status: b.status,
            client_unique_id: b.client_unique_id,
            previous_label_or_app_version: b.previous_label_or_app_version,
        }
    }
}

/// Body of a download status report.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadReportBody {
    #[serde(default, alias = "deployment_key")]
    pub deployment_key: String,
    #[serde(default)]
    pub label: String,
    #[serde(alias = "client_unique_id")]
    pub client_unique_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_accepts_both_spellings() {
        let camel: UpdateCheckQuery =
            serde_json::from_str(r#"{"deploymentKey":"k","appVersion":"1.0.0"}"#).unwrap();
        let snake: UpdateCheckQuery =
            serde_json::from_str(r#"{"deployment_key":"k","app_version":"1.0.0"}"#).unwrap();

        assert_eq!(camel.deployment_key, snake.deployment_key);
        assert_eq!(camel.app_version, snake.app_version);
    }

    #[test]
    fn test_unavailable_info_serialization() {
        let info = UpdateInfo::from_result(
            UpdateCheckResult {
                is_available: false,
                update_app_version: true,
                app_version: "2.0.0".to_string(),
                package: None,
            },
            "k",
            "http://localhost:3000",
        );

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["isAvailable"], false);
        assert_eq!(json["updateAppVersion"], true);
        assert_eq!(json["appVersion"], "2.0.0");
        assert!(json.get("downloadURL").is_none());

        let snake = serde_json::to_value(UpdateInfoSnake::from(info)).unwrap();
        assert_eq!(snake["target_binary_range"], "2.0.0");
        assert_eq!(snake["update_app_version"], true);
    }
}
