//! Storage trait backing the acquisition, management and auth routers.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{Account, App, Deployment, NewPackage, Package, StatusReport};

/// Errors surfaced by storage implementations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} already exists")]
    AlreadyExists(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Storage interface for accounts, apps, deployments and releases.
///
/// Implementations must be thread-safe; a single instance is shared by every
/// router built from the same configuration.
///
/// # Implementations
///
/// - [`crate::infrastructure::storage::InMemoryStorage`] - process-local store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Storage: Send + Sync {
    /// Verifies the backend can serve requests.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the backend is unreachable.
    async fn check_health(&self) -> Result<(), StorageError>;

    /// Resolves the account owning an access key.
    ///
    /// `key_hash` is the HMAC of the raw key, never the key itself.
    async fn account_for_access_key(&self, key_hash: &str)
    -> Result<Option<Account>, StorageError>;

    /// Lists the apps owned by an account, ordered by name.
    async fn list_apps(&self, account_id: &str) -> Result<Vec<App>, StorageError>;

    /// Stores a new app.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::AlreadyExists`] if the account already owns an
    /// app with the same name.
    async fn add_app(&self, app: App) -> Result<App, StorageError>;

    /// Returns the deployments of one of the account's apps.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the app does not exist.
    async fn list_deployments(
        &self,
        account_id: &str,
        app_name: &str,
    ) -> Result<Vec<Deployment>, StorageError>;

    /// Looks up a deployment by its client-facing key.
    async fn deployment_by_key(&self, deployment_key: &str)
    -> Result<Option<Deployment>, StorageError>;

    /// Appends a release to a deployment's history and assigns its label.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the app or deployment does not exist.
    async fn commit_package(
        &self,
        account_id: &str,
        app_name: &str,
        deployment_name: &str,
        package: NewPackage,
    ) -> Result<Package, StorageError>;

    /// Records a deploy or download report for a deployment.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the deployment key is unknown.
    async fn record_status(
        &self,
        deployment_key: &str,
        report: StatusReport,
    ) -> Result<(), StorageError>;
}
