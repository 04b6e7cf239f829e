//! Authentication service for access key validation.

use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::entities::Account;
use crate::domain::repositories::Storage;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Service for authenticating management requests via access keys.
///
/// Keys are hashed with HMAC-SHA256 (keyed by `signing_secret`) before lookup,
/// so storage never sees raw access keys.
pub struct AuthService {
    storage: Arc<dyn Storage>,
    signing_secret: String,
}

impl AuthService {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `storage` - backend resolving key hashes to accounts
    /// - `signing_secret` - HMAC key; must match the value used when keys were stored
    pub fn new(storage: Arc<dyn Storage>, signing_secret: String) -> Self {
        Self {
            storage,
            signing_secret,
        }
    }

    /// Hashes a raw access key with HMAC-SHA256 using the server signing secret.
    ///
    /// Returns a 64-character lowercase hex-encoded MAC.
    pub fn hash_access_key(&self, access_key: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(access_key.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Resolves a raw access key to its account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the key is unknown.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn authenticate(&self, access_key: &str) -> Result<Account, AppError> {
        let key_hash = self.hash_access_key(access_key);

        match self.storage.account_for_access_key(&key_hash).await? {
            Some(account) => Ok(account),
            None => Err(AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Invalid or revoked access key"}),
            )),
        }
    }
}
