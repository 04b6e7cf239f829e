//! HTTP server initialization and runtime setup.

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::application::services::AuthService;
use crate::config::Config;
use crate::domain::entities::Account;
use crate::infrastructure::storage::InMemoryStorage;
use crate::routes::app_router;

/// Id of the account created for `SEED_ACCESS_KEY`.
pub const SEED_ACCOUNT_ID: &str = "default";

/// Runs the HTTP server with the given configuration.
///
/// Initializes the in-memory store, seeds an account when
/// `SEED_ACCESS_KEY` is set, and serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if:
/// - Seeding the store fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let storage = Arc::new(InMemoryStorage::new());

    if let Some(access_key) = &config.seed_access_key {
        seed_account(&storage, &config.access_key_signing_secret, access_key).await?;
        tracing::info!(account = SEED_ACCOUNT_ID, "Seeded account from SEED_ACCESS_KEY");
    }

    let app = app_router(&config, storage);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Creates the seed account and registers `access_key` for it.
///
/// # Errors
///
/// Returns an error if the access key is already registered.
pub async fn seed_account(
    storage: &Arc<InMemoryStorage>,
    signing_secret: &str,
    access_key: &str,
) -> Result<Account> {
    let account = Account::new(SEED_ACCOUNT_ID, "admin@localhost", "Administrator");
    storage.add_account(account.clone()).await;

    let key_hash =
        AuthService::new(storage.clone(), signing_secret.to_string()).hash_access_key(access_key);
    storage.add_access_key(&account.id, &key_hash).await?;

    Ok(account)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
