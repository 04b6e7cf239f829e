//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup, validated, and then injected into
//! the middleware and router factories. Nothing reads the environment per request.
//!
//! ## Required Variables
//!
//! - `ACCESS_KEY_SIGNING_SECRET` - HMAC key used to hash access keys
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `UPLOAD_SIZE_LIMIT_MB` - Per-file upload limit in megabytes (default: 200)
//! - `REQUEST_TIMEOUT_MS` - Request timeout in milliseconds (default: 30000)
//! - `CLI_VERSION` - Advertised in the `X-CodePush-CLI-Version` response header
//! - `CORS_ALLOWED_ORIGIN` - `Access-Control-Allow-Origin` value (default: `*`)
//! - `APPINSIGHTS_INSTRUMENTATIONKEY` - Enables request telemetry when set
//! - `AUTH_DEFAULT_PROVIDER` - Provider used by legacy login routes (default: `github`)
//! - `AUTH_PROVIDER_<NAME>_URL` - Sign-in URL for provider `<name>` (lowercased)
//! - `SEED_ACCESS_KEY` - Access key registered for a local account at startup

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Upload limit applied when `UPLOAD_SIZE_LIMIT_MB` is missing or unusable.
pub const DEFAULT_UPLOAD_SIZE_LIMIT_MB: u64 = 200;

const PROVIDER_PREFIX: &str = "AUTH_PROVIDER_";
const PROVIDER_SUFFIX: &str = "_URL";

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    /// Base URL clients use to reach this server, used in download links.
    pub public_url: String,
    pub log_level: String,
    pub log_format: String,
    /// Largest accepted uploaded part, in megabytes.
    pub upload_size_limit_mb: u64,
    pub request_timeout_ms: u64,
    /// HMAC signing secret used to hash access keys before lookup.
    pub access_key_signing_secret: String,
    pub cli_version: Option<String>,
    pub cors_allowed_origin: String,
    pub instrumentation_key: Option<String>,
    pub auth_default_provider: String,
    /// `(provider, sign-in url)` pairs, sorted by provider name.
    pub auth_providers: Vec<(String, String)>,
    pub seed_access_key: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `ACCESS_KEY_SIGNING_SECRET` is missing.
    pub fn from_env() -> Result<Self> {
        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let public_url =
            env::var("PUBLIC_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let upload_size_limit_mb =
            parse_upload_size_limit(env::var("UPLOAD_SIZE_LIMIT_MB").ok().as_deref());

        let request_timeout_ms = env::var("REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30_000);

        let access_key_signing_secret = env::var("ACCESS_KEY_SIGNING_SECRET")
            .context("ACCESS_KEY_SIGNING_SECRET must be set")?;

        let cli_version = env::var("CLI_VERSION").ok().filter(|v| !v.is_empty());
        let cors_allowed_origin =
            env::var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|_| "*".to_string());
        let instrumentation_key = env::var("APPINSIGHTS_INSTRUMENTATIONKEY")
            .ok()
            .filter(|v| !v.is_empty());
        let auth_default_provider =
            env::var("AUTH_DEFAULT_PROVIDER").unwrap_or_else(|_| "github".to_string());
        let seed_access_key = env::var("SEED_ACCESS_KEY").ok().filter(|v| !v.is_empty());

        Ok(Self {
            listen_addr,
            public_url,
            log_level,
            log_format,
            upload_size_limit_mb,
            request_timeout_ms,
            access_key_signing_secret,
            cli_version,
            cors_allowed_origin,
            instrumentation_key,
            auth_default_provider,
            auth_providers: Self::load_auth_providers(),
            seed_access_key,
        })
    }

    /// Collects `AUTH_PROVIDER_<NAME>_URL` variables.
    fn load_auth_providers() -> Vec<(String, String)> {
        let mut providers: Vec<(String, String)> = env::vars()
            .filter_map(|(key, value)| {
                let name = key
                    .strip_prefix(PROVIDER_PREFIX)?
                    .strip_suffix(PROVIDER_SUFFIX)?;
                if name.is_empty() || value.is_empty() {
                    return None;
                }
                Some((name.to_ascii_lowercase(), value))
            })
            .collect();
        providers.sort();
        providers
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is invalid
    /// - `public_url` is not an absolute URL
    /// - `request_timeout_ms` is zero
    /// - `access_key_signing_secret` is empty
    pub fn validate(&self) -> Result<()> {
        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if url::Url::parse(&self.public_url).is_err() {
            anyhow::bail!("PUBLIC_URL must be an absolute URL, got '{}'", self.public_url);
        }

        if self.request_timeout_ms == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_MS must be greater than 0");
        }

        if self.access_key_signing_secret.is_empty() {
            anyhow::bail!("ACCESS_KEY_SIGNING_SECRET must not be empty");
        }

        if let Some((name, url)) = self
            .auth_providers
            .iter()
            .find(|(_, url)| url::Url::parse(url).is_err())
        {
            anyhow::bail!(
                "AUTH_PROVIDER_{}_URL is not a valid URL: '{}'",
                name.to_ascii_uppercase(),
                url
            );
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Public URL: {}", self.public_url);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
        tracing::info!("  Upload size limit: {} MB", self.upload_size_limit_mb);
        tracing::info!("  Request timeout: {} ms", self.request_timeout_ms);
        tracing::info!(
            "  Telemetry: {}",
            if self.instrumentation_key.is_some() { "enabled" } else { "disabled" }
        );

        let providers: Vec<&str> = self.auth_providers.iter().map(|(n, _)| n.as_str()).collect();
        tracing::info!(
            "  Auth providers: [{}] (default: {})",
            providers.join(", "),
            self.auth_default_provider
        );
    }
}

/// Interprets `UPLOAD_SIZE_LIMIT_MB`.
///
/// Leading decimal digits are used (`"10MB"` is 10), after an optional `+`
/// sign. A missing value, a value without leading digits, or zero falls back
/// to [`DEFAULT_UPLOAD_SIZE_LIMIT_MB`].
pub fn parse_upload_size_limit(raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        return DEFAULT_UPLOAD_SIZE_LIMIT_MB;
    };

    let trimmed = raw.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());

    match trimmed[..digits_end].parse::<u64>() {
        Ok(limit) if limit > 0 => limit,
        _ => DEFAULT_UPLOAD_SIZE_LIMIT_MB,
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if required variables are missing or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn test_config() -> Config {
        Config {
            listen_addr: "0.0.0.0:3000".to_string(),
            public_url: "http://localhost:3000".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            upload_size_limit_mb: 200,
            request_timeout_ms: 30_000,
            access_key_signing_secret: "test-secret".to_string(),
            cli_version: None,
            cors_allowed_origin: "*".to_string(),
            instrumentation_key: None,
            auth_default_provider: "github".to_string(),
            auth_providers: vec![],
            seed_access_key: None,
        }
    }

    #[test]
    fn test_parse_upload_size_limit() {
        assert_eq!(parse_upload_size_limit(None), 200);
        assert_eq!(parse_upload_size_limit(Some("")), 200);
        assert_eq!(parse_upload_size_limit(Some("abc")), 200);
        assert_eq!(parse_upload_size_limit(Some("0")), 200);
        assert_eq!(parse_upload_size_limit(Some("-5")), 200);
        assert_eq!(parse_upload_size_limit(Some("10")), 10);
        assert_eq!(parse_upload_size_limit(Some(" 25")), 25);
        assert_eq!(parse_upload_size_limit(Some("10MB")), 10);
        assert_eq!(parse_upload_size_limit(Some("+10")), 10);
        assert_eq!(parse_upload_size_limit(Some(" +7.5")), 7);
        assert_eq!(parse_upload_size_limit(Some("+")), 200);
    }

    #[test]
    fn test_config_validation() {
        let mut config = test_config();
        assert!(config.validate().is_ok());

        config.log_format = "invalid".to_string();
        assert!(config.validate().is_err());

        config.log_format = "json".to_string();
        assert!(config.validate().is_ok());

        config.listen_addr = "3000".to_string();
        assert!(config.validate().is_err());

        config.listen_addr = "0.0.0.0:3000".to_string();
        config.request_timeout_ms = 0;
        assert!(config.validate().is_err());

        config.request_timeout_ms = 1000;
        config.access_key_signing_secret = String::new();
        assert!(config.validate().is_err());

        config.access_key_signing_secret = "secret".to_string();
        config.auth_providers = vec![("github".to_string(), "not a url".to_string())];
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_upload_limit_from_env() {
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            env::set_var("ACCESS_KEY_SIGNING_SECRET", "secret");
            env::remove_var("UPLOAD_SIZE_LIMIT_MB");
        }
        assert_eq!(Config::from_env().unwrap().upload_size_limit_mb, 200);

        unsafe {
            env::set_var("UPLOAD_SIZE_LIMIT_MB", "not-a-number");
        }
        assert_eq!(Config::from_env().unwrap().upload_size_limit_mb, 200);

        unsafe {
            env::set_var("UPLOAD_SIZE_LIMIT_MB", "10");
        }
        assert_eq!(Config::from_env().unwrap().upload_size_limit_mb, 10);

        // Cleanup
        unsafe {
            env::remove_var("UPLOAD_SIZE_LIMIT_MB");
            env::remove_var("ACCESS_KEY_SIGNING_SECRET");
        }
    }

    #[test]
    #[serial]
    fn test_signing_secret_required() {
        // SAFETY: Tests are run serially
        unsafe {
            env::remove_var("ACCESS_KEY_SIGNING_SECRET");
        }
        assert!(Config::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_auth_providers_from_env() {
        // SAFETY: Tests are run serially
        unsafe {
            env::set_var("ACCESS_KEY_SIGNING_SECRET", "secret");
            env::set_var("AUTH_PROVIDER_GITHUB_URL", "https://github.com/login/oauth/authorize");
            env::set_var("AUTH_PROVIDER_MICROSOFT_URL", "https://login.microsoftonline.com/");
            env::set_var("AUTH_PROVIDER__URL", "https://ignored.example.com/");
        }

        let config = Config::from_env().unwrap();
        assert_eq!(
            config.auth_providers,
            vec![
                (
                    "github".to_string(),
                    "https://github.com/login/oauth/authorize".to_string()
                ),
                (
                    "microsoft".to_string(),
                    "https://login.microsoftonline.com/".to_string()
                ),
            ]
        );

        // Cleanup
        unsafe {
            env::remove_var("ACCESS_KEY_SIGNING_SECRET");
            env::remove_var("AUTH_PROVIDER_GITHUB_URL");
            env::remove_var("AUTH_PROVIDER_MICROSOFT_URL");
            env::remove_var("AUTH_PROVIDER__URL");
        }
    }
}
