//! Handlers for auth endpoints.

use axum::{
    Json,
    extract::{Path, State},
    response::Redirect,
};
use serde_json::json;
use std::sync::Arc;
use url::Url;

use crate::api::dto::auth::AuthenticatedResponse;
use crate::api::middleware::{AuthenticatedAccount, ProviderRedirects};
use crate::error::AppError;

/// `GET /authenticated`
pub async fn authenticated_handler(_account: AuthenticatedAccount) -> Json<AuthenticatedResponse> {
    Json(AuthenticatedResponse {
        authenticated: true,
    })
}

/// `GET /auth/login/{provider}`
pub async fn login_handler(
    State(redirects): State<Arc<ProviderRedirects>>,
    Path(provider): Path<String>,
) -> Result<Redirect, AppError> {
    provider_redirect(&redirects, &provider, "login")
}

/// `GET /auth/register/{provider}`
pub async fn register_handler(
    State(redirects): State<Arc<ProviderRedirects>>,
    Path(provider): Path<String>,
) -> Result<Redirect, AppError> {
    provider_redirect(&redirects, &provider, "register")
}

/// `GET /auth/login`
pub async fn legacy_login_handler(State(redirects): State<Arc<ProviderRedirects>>) -> Redirect {
    Redirect::to(&format!("/auth/login/{}", redirects.default_provider()))
}

/// `GET /auth/register`
pub async fn legacy_register_handler(
    State(redirects): State<Arc<ProviderRedirects>>,
) -> Redirect {
    Redirect::to(&format!("/auth/register/{}", redirects.default_provider()))
}

/// Redirects to the provider URL with `action` appended to its query.
fn provider_redirect(
    redirects: &ProviderRedirects,
    provider: &str,
    action: &str,
) -> Result<Redirect, AppError> {
    let target = redirects.url_for(provider).ok_or_else(|| {
        AppError::not_found("Unknown auth provider", json!({"provider": provider}))
    })?;

    let mut url = Url::parse(target).map_err(|e| {
        tracing::error!(provider, error = %e, "Invalid provider URL");
        AppError::internal("Invalid provider configuration", json!({}))
    })?;
    url.query_pairs_mut().append_pair("action", action);

    Ok(Redirect::to(url.as_str()))
}
