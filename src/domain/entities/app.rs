//! App and deployment entities.

use chrono::{DateTime, Utc};

use super::package::Package;

/// Deployments created alongside every new app.
pub const DEFAULT_DEPLOYMENTS: [&str; 2] = ["Staging", "Production"];

/// An application registered by an account.
#[derive(Debug, Clone, PartialEq)]
pub struct App {
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub deployments: Vec<Deployment>,
}

impl App {
    /// Returns the deployment with the given name, if any.
    pub fn deployment(&self, name: &str) -> Option<&Deployment> {
        self.deployments.iter().find(|d| d.name == name)
    }
}

/// A release channel of an app, addressed by clients through its key.
///
/// `package_history` is ordered oldest first; the last entry is the
/// release served by update checks.
#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
    pub name: String,
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub package_history: Vec<Package>,
}

impl Deployment {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            created_at: Utc::now(),
            package_history: Vec::new(),
        }
    }

    /// The most recent release, if anything has been released yet.
    pub fn latest_package(&self) -> Option<&Package> {
        self.package_history.last()
    }

    /// Label the next committed release will receive (`v1`, `v2`, ...).
    pub fn next_label(&self) -> String {
        format!("v{}", self.package_history.len() + 1)
    }
}
