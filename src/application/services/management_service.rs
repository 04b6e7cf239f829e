//! App, deployment and release management.

use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{
    Account, App, DEFAULT_DEPLOYMENTS, Deployment, NewPackage, Package,
};
use crate::domain::repositories::Storage;
use crate::error::AppError;

/// Length of generated deployment keys.
const DEPLOYMENT_KEY_LENGTH: usize = 40;

const MAX_APP_NAME_LENGTH: usize = 128;

/// Generates a random alphanumeric deployment key.
pub fn generate_deployment_key() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(DEPLOYMENT_KEY_LENGTH)
        .map(char::from)
        .collect()
}

/// Service behind the management router.
pub struct ManagementService {
    storage: Arc<dyn Storage>,
}

impl ManagementService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn list_apps(&self, account: &Account) -> Result<Vec<App>, AppError> {
        Ok(self.storage.list_apps(&account.id).await?)
    }

    /// Registers an app with the default `Staging` and `Production` deployments.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the name is empty, too long, or
    /// contains `/`.
    /// Returns [`AppError::Conflict`] if the account already has an app with
    /// that name.
    pub async fn create_app(&self, account: &Account, name: &str) -> Result<App, AppError> {
        let name = name.trim();
        if name.is_empty() || name.len() > MAX_APP_NAME_LENGTH || name.contains('/') {
            return Err(AppError::bad_request(
                "Invalid app name",
                json!({"name": name, "max_length": MAX_APP_NAME_LENGTH}),
            ));
        }

        let app = App {
            name: name.to_string(),
            owner_id: account.id.clone(),
            created_at: Utc::now(),
            deployments: DEFAULT_DEPLOYMENTS
                .iter()
                .map(|d| Deployment::new(*d, generate_deployment_key()))
                .collect(),
        };

        let app = self.storage.add_app(app).await?;
        tracing::info!(account = %account.id, app = %app.name, "App created");
        Ok(app)
    }

    pub async fn list_deployments(
        &self,
        account: &Account,
        app_name: &str,
    ) -> Result<Vec<Deployment>, AppError> {
        Ok(self.storage.list_deployments(&account.id, app_name).await?)
    }

    /// Commits an uploaded bundle as the next release of a deployment.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the target app version is empty.
    /// Returns [`AppError::NotFound`] if the app or deployment does not exist.
    pub async fn release(
        &self,
        account: &Account,
        app_name: &str,
        deployment_name: &str,
        package: NewPackage,
    ) -> Result<Package, AppError> {
        if package.app_version.trim().is_empty() {
            return Err(AppError::bad_request(
                "appVersion is required",
                json!({}),
            ));
        }

        let package = self
            .storage
            .commit_package(&account.id, app_name, deployment_name, package)
            .await?;

        tracing::info!(
            account = %account.id,
            app = app_name,
            deployment = deployment_name,
            label = %package.label,
            size = package.size,
            "Release committed"
        );
        Ok(package)
    }
}
