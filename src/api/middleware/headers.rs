//! Response headers middleware: CORS, caching and content-sniffing headers.

use axum::http::{HeaderName, HeaderValue, Method, header};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer, ExposeHeaders},
    set_header::SetResponseHeaderLayer,
};

use super::layer::MiddlewareLayer;

/// Header carrying the CLI version the server expects clients to run.
pub const CLI_VERSION_HEADER: &str = "x-codepush-cli-version";

const DEFAULT_ALLOWED_HEADERS: &str =
    "Origin, X-Requested-With, Content-Type, Accept, Authorization, X-CodePush-CLI-Version, \
     X-CodePush-Plugin-Name, X-CodePush-Plugin-Version, X-CodePush-SDK-Version";

const ALLOWED_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PATCH, Method::DELETE];

/// Options for the response headers middleware.
#[derive(Debug, Clone)]
pub struct HeadersConfig {
    /// `Access-Control-Allow-Origin` value, `*` for any origin.
    pub allowed_origin: String,
    /// Value for `X-CodePush-CLI-Version`; omitted when `None`.
    pub cli_version: Option<String>,
    /// Comma-separated `Access-Control-Allow-Headers` list.
    pub allowed_headers: String,
    /// Comma-separated `Access-Control-Expose-Headers` list.
    pub exposed_headers: String,
}

impl Default for HeadersConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "*".to_string(),
            cli_version: None,
            allowed_headers: DEFAULT_ALLOWED_HEADERS.to_string(),
            exposed_headers: "Location".to_string(),
        }
    }
}

/// Security headers on every response plus CORS handling.
///
/// `OPTIONS` requests are answered as CORS preflights and never reach the
/// routes. Values that are not valid header text are skipped with a warning.
pub fn layer(config: HeadersConfig) -> MiddlewareLayer {
    let cli_version = config
        .cli_version
        .as_deref()
        .and_then(|value| header_value(CLI_VERSION_HEADER, value));

    MiddlewareLayer::new(
        ServiceBuilder::new()
            .layer(SetResponseHeaderLayer::overriding(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-cache"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                HeaderName::from_static(CLI_VERSION_HEADER),
                cli_version,
            ))
            .layer(cors(&config)),
    )
}

fn cors(config: &HeadersConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(AllowHeaders::list(header_names(&config.allowed_headers)))
        .expose_headers(ExposeHeaders::list(header_names(&config.exposed_headers)));

    match config.allowed_origin.trim() {
        "*" => cors.allow_origin(AllowOrigin::any()),
        origin => match header_value("access-control-allow-origin", origin) {
            Some(origin) => cors.allow_origin(AllowOrigin::exact(origin)),
            None => cors,
        },
    }
}

fn header_value(name: &str, value: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(value)
        .inspect_err(|_| tracing::warn!("Skipping invalid value for header {}: {:?}", name, value))
        .ok()
}

/// Parses a comma-separated header name list, skipping invalid entries.
fn header_names(list: &str) -> Vec<HeaderName> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| {
            HeaderName::from_bytes(name.as_bytes())
                .inspect_err(|_| tracing::warn!("Skipping invalid header name: {:?}", name))
                .ok()
        })
        .collect()
}
