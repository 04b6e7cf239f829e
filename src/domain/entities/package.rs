//! Released packages and client status reports.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::PathBuf;

/// A released update bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub label: String,
    pub app_version: String,
    pub description: Option<String>,
    pub is_mandatory: bool,
    /// Hex-encoded SHA-256 of the bundle contents.
    pub package_hash: String,
    /// Where the uploaded bundle was written.
    pub blob_path: PathBuf,
    pub size: u64,
    pub upload_time: DateTime<Utc>,
}

/// Input data for committing a release; the label is assigned by storage.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPackage {
    pub app_version: String,
    pub description: Option<String>,
    pub is_mandatory: bool,
    pub package_hash: String,
    pub blob_path: PathBuf,
    pub size: u64,
}

impl NewPackage {
    pub fn into_package(self, label: String) -> Package {
        Package {
            label,
            app_version: self.app_version,
            description: self.description,
            is_mandatory: self.is_mandatory,
            package_hash: self.package_hash,
            blob_path: self.blob_path,
            size: self.size,
            upload_time: Utc::now(),
        }
    }
}

/// Outcome of an install reported by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum DeploymentStatus {
    DeploymentSucceeded,
    DeploymentFailed,
}

/// A status report sent by a client SDK.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusReport {
    Deploy {
        label: Option<String>,
        app_version: String,
        status: Option<DeploymentStatus>,
        client_unique_id: Option<String>,
        previous_label_or_app_version: Option<String>,
    },
    Download {
        label: String,
        client_unique_id: Option<String>,
    },
}

/// Per-release counters aggregated from status reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackageMetrics {
    pub active: u64,
    pub downloaded: u64,
    pub installed: u64,
    pub failed: u64,
}
