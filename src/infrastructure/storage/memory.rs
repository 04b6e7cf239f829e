//! Process-local storage backed by a `tokio` read-write lock.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::{
    Account, App, Deployment, DeploymentStatus, NewPackage, Package, PackageMetrics, StatusReport,
};
use crate::domain::repositories::{Storage, StorageError};

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    /// access key hash -> account id
    access_keys: HashMap<String, String>,
    apps: Vec<App>,
    /// (deployment key, label) -> counters
    metrics: HashMap<(String, String), PackageMetrics>,
}

impl Inner {
    fn app_mut(&mut self, account_id: &str, app_name: &str) -> Result<&mut App, StorageError> {
        self.apps
            .iter_mut()
            .find(|a| a.owner_id == account_id && a.name == app_name)
            .ok_or_else(|| StorageError::NotFound(format!("App '{app_name}'")))
    }

    fn deployment_exists(&self, deployment_key: &str) -> bool {
        self.apps
            .iter()
            .flat_map(|a| a.deployments.iter())
            .any(|d| d.key == deployment_key)
    }

    fn metrics_mut(&mut self, deployment_key: &str, label: &str) -> &mut PackageMetrics {
        self.metrics
            .entry((deployment_key.to_string(), label.to_string()))
            .or_default()
    }
}

/// Storage kept entirely in memory.
///
/// Nothing survives a restart. Accounts and access keys are seeded through
/// [`InMemoryStorage::add_account`] and [`InMemoryStorage::add_access_key`].
#[derive(Default)]
pub struct InMemoryStorage {
    inner: RwLock<Inner>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        debug!("Using InMemoryStorage (nothing is persisted)");
        Self::default()
    }

    /// Registers an account, replacing any account with the same id.
    pub async fn add_account(&self, account: Account) {
        let mut inner = self.inner.write().await;
        inner.accounts.insert(account.id.clone(), account);
    }

    /// Associates an access key hash with an account.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the account is unknown.
    pub async fn add_access_key(
        &self,
        account_id: &str,
        key_hash: &str,
    ) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        if !inner.accounts.contains_key(account_id) {
            return Err(StorageError::NotFound(format!("Account '{account_id}'")));
        }
        inner
            .access_keys
            .insert(key_hash.to_string(), account_id.to_string());
        Ok(())
    }

    /// Counters for one release of a deployment.
    pub async fn package_metrics(&self, deployment_key: &str, label: &str) -> PackageMetrics {
        let inner = self.inner.read().await;
        inner
            .metrics
            .get(&(deployment_key.to_string(), label.to_string()))
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn check_health(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn account_for_access_key(
        &self,
        key_hash: &str,
    ) -> Result<Option<Account>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner
            .access_keys
            .get(key_hash)
            .and_then(|id| inner.accounts.get(id))
            .cloned())
    }

    async fn list_apps(&self, account_id: &str) -> Result<Vec<App>, StorageError> {
        let inner = self.inner.read().await;
        let mut apps: Vec<App> = inner
            .apps
            .iter()
            .filter(|a| a.owner_id == account_id)
            .cloned()
            .collect();
        apps.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(apps)
    }

    async fn add_app(&self, app: App) -> Result<App, StorageError> {
        let mut inner = self.inner.write().await;
        let duplicate = inner
            .apps
            .iter()
            .any(|a| a.owner_id == app.owner_id && a.name.eq_ignore_ascii_case(&app.name));
        if duplicate {
            return Err(StorageError::AlreadyExists(format!("App '{}'", app.name)));
        }
        inner.apps.push(app.clone());
        Ok(app)
    }

    async fn list_deployments(
        &self,
        account_id: &str,
        app_name: &str,
    ) -> Result<Vec<Deployment>, StorageError> {
        let inner = self.inner.read().await;
        inner
            .apps
            .iter()
            .find(|a| a.owner_id == account_id && a.name == app_name)
            .map(|a| a.deployments.clone())
            .ok_or_else(|| StorageError::NotFound(format!("App '{app_name}'")))
    }

    async fn deployment_by_key(
        &self,
        deployment_key: &str,
    ) -> Result<Option<Deployment>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner
            .apps
            .iter()
            .flat_map(|a| a.deployments.iter())
            .find(|d| d.key == deployment_key)
            .cloned())
    }

    async fn commit_package(
        &self,
        account_id: &str,
        app_name: &str,
        deployment_name: &str,
        package: NewPackage,
    ) -> Result<Package, StorageError> {
        let mut inner = self.inner.write().await;
        let app = inner.app_mut(account_id, app_name)?;
        let deployment = app
            .deployments
            .iter_mut()
            .find(|d| d.name == deployment_name)
            .ok_or_else(|| StorageError::NotFound(format!("Deployment '{deployment_name}'")))?;

        let package = package.into_package(deployment.next_label());
        deployment.package_history.push(package.clone());
        Ok(package)
    }

    async fn record_status(
        &self,
        deployment_key: &str,
        report: StatusReport,
    ) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        if !inner.deployment_exists(deployment_key) {
            return Err(StorageError::NotFound(format!(
                "Deployment key '{deployment_key}'"
            )));
        }

        match report {
            StatusReport::Download { label, .. } => {
                inner.metrics_mut(deployment_key, &label).downloaded += 1;
            }
            StatusReport::Deploy {
                label: Some(label),
                status,
                previous_label_or_app_version,
                ..
            } => {
                match status {
                    Some(DeploymentStatus::DeploymentFailed) => {
                        inner.metrics_mut(deployment_key, &label).failed += 1;
                    }
                    _ => {
                        let metrics = inner.metrics_mut(deployment_key, &label);
                        metrics.installed += 1;
                        metrics.active += 1;

                        if let Some(previous) = previous_label_or_app_version {
                            let previous = inner.metrics_mut(deployment_key, &previous);
                            previous.active = previous.active.saturating_sub(1);
                        }
                    }
                }
            }
            // A report without a label is a binary (app store) install; nothing to count.
            StatusReport::Deploy { label: None, .. } => {}
        }

        Ok(())
    }
}
