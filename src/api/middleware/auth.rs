//! Bearer access key authentication and the auth router factory.

use axum::{
    Router,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::{Next, from_fn_with_state},
    response::Response,
    routing::get,
};
use axum_auth::AuthBearer;
use std::{collections::HashMap, sync::Arc};

use super::layer::MiddlewareLayer;
use crate::api::handlers::auth::{
    authenticated_handler, legacy_login_handler, legacy_register_handler, login_handler,
    register_handler,
};
use crate::application::services::AuthService;
use crate::domain::entities::Account;
use crate::domain::repositories::Storage;
use crate::error::AppError;

/// Options for [`Authentication::new`].
pub struct AuthenticationConfig {
    pub storage: Arc<dyn Storage>,
    /// HMAC key used to hash access keys before lookup.
    pub signing_secret: String,
    /// `(provider name, redirect URL)` pairs.
    pub providers: Vec<(String, String)>,
    /// Provider the legacy `/auth/login` and `/auth/register` routes use.
    pub default_provider: String,
}

/// Identity provider redirect targets.
#[derive(Debug, Clone)]
pub struct ProviderRedirects {
    providers: HashMap<String, String>,
    default_provider: String,
}

impl ProviderRedirects {
    pub fn new(providers: Vec<(String, String)>, default_provider: impl Into<String>) -> Self {
        Self {
            providers: providers
                .into_iter()
                .map(|(name, url)| (name.to_lowercase(), url))
                .collect(),
            default_provider: default_provider.into().to_lowercase(),
        }
    }

    /// Redirect URL for a provider, matched case-insensitively.
    pub fn url_for(&self, provider: &str) -> Option<&str> {
        self.providers
            .get(&provider.to_lowercase())
            .map(String::as_str)
    }

    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }
}

/// Shared authentication instance.
///
/// Cloning is cheap; every layer and router built from the same handle
/// shares one [`AuthService`].
#[derive(Clone)]
pub struct Authentication {
    service: Arc<AuthService>,
    redirects: Arc<ProviderRedirects>,
}

impl Authentication {
    pub fn new(config: AuthenticationConfig) -> Self {
        Self {
            service: Arc::new(AuthService::new(config.storage, config.signing_secret)),
            redirects: Arc::new(ProviderRedirects::new(
                config.providers,
                config.default_provider,
            )),
        }
    }

    /// Layer that rejects requests without a valid Bearer access key.
    ///
    /// On success the resolved [`Account`] is inserted as a request extension,
    /// readable through [`AuthenticatedAccount`].
    pub fn authenticate(&self) -> MiddlewareLayer {
        MiddlewareLayer::new(from_fn_with_state(self.service.clone(), layer))
    }

    /// Auth routes.
    ///
    /// # Endpoints
    ///
    /// - `GET /authenticated`              - Checks the Bearer access key
    /// - `GET /auth/login/{provider}`      - Redirects to the provider login
    /// - `GET /auth/register/{provider}`   - Redirects to the provider sign-up
    pub fn router(&self) -> Router {
        let authenticated = Router::new()
            .route("/authenticated", get(authenticated_handler))
            .route_layer(self.authenticate());

        Router::new()
            .route("/auth/login/{provider}", get(login_handler))
            .route("/auth/register/{provider}", get(register_handler))
            .with_state(self.redirects.clone())
            .merge(authenticated)
    }

    /// Provider-less `/auth/login` and `/auth/register`, redirecting to the
    /// default provider.
    pub fn legacy_router(&self) -> Router {
        Router::new()
            .route("/auth/login", get(legacy_login_handler))
            .route("/auth/register", get(legacy_register_handler))
            .with_state(self.redirects.clone())
    }

    pub fn service(&self) -> &AuthService {
        &self.service
    }
}

/// Resolves the Bearer access key to an [`Account`] and attaches it to the
/// request.
///
/// # Errors
///
/// Returns `401 Unauthorized` when the header is missing or malformed, or
/// when no account owns the access key.
pub async fn layer(
    State(service): State<Arc<AuthService>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                serde_json::json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    let account = service.authenticate(&token).await?;
    tracing::debug!(account = %account.id, "Request authenticated");
    parts.extensions.insert(account);

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Extractor for the account resolved by [`Authentication::authenticate`].
///
/// Rejects with `401 Unauthorized` when the route is not behind the layer.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount(pub Account);

impl<S> FromRequestParts<S> for AuthenticatedAccount
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Account>()
            .cloned()
            .map(AuthenticatedAccount)
            .ok_or_else(|| {
                AppError::unauthorized(
                    "Unauthorized",
                    serde_json::json!({"reason": "Request is not authenticated"}),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_lookup_is_case_insensitive() {
        let redirects = ProviderRedirects::new(
            vec![("GitHub".to_string(), "https://github.com/login".to_string())],
            "GITHUB",
        );

        assert_eq!(redirects.url_for("github"), Some("https://github.com/login"));
        assert_eq!(redirects.url_for("GITHUB"), Some("https://github.com/login"));
        assert_eq!(redirects.url_for("gitlab"), None);
        assert_eq!(redirects.default_provider(), "github");
    }
}
