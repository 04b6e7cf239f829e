//! Input sanitization middleware.
//!
//! Trims query parameter values and strips ASCII control characters from
//! them. JSON bodies get the same treatment for every string value.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, StatusCode, Uri, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde_json::Value;
use url::form_urlencoded;

/// Largest JSON body the sanitizer will buffer.
pub const MAX_SANITIZED_BODY_BYTES: usize = 1_048_576;

/// Sanitizes query values and JSON bodies before they reach the routes.
///
/// # Errors
///
/// Answers `413 Payload Too Large` for JSON bodies above
/// [`MAX_SANITIZED_BODY_BYTES`] and `400 Bad Request` when the body cannot be
/// read.
pub async fn layer(req: Request, next: Next) -> Result<Response, Response> {
    let (mut parts, body) = req.into_parts();

    if let Some(uri) = sanitize_uri(&parts.uri) {
        parts.uri = uri;
    }

    if !is_json(&parts.headers) {
        return Ok(next.run(Request::from_parts(parts, body)).await);
    }

    let bytes = buffer_body(body).await?;

    // Malformed JSON is left for the handler's extractor to reject.
    let body = match serde_json::from_slice::<Value>(&bytes) {
        Ok(mut value) => {
            sanitize_json(&mut value);
            let encoded = value.to_string();
            parts.headers.remove(header::CONTENT_LENGTH);
            Body::from(encoded)
        }
        Err(_) => Body::from(bytes),
    };

    Ok(next.run(Request::from_parts(parts, body)).await)
}

async fn buffer_body(body: Body) -> Result<Bytes, Response> {
    match Limited::new(body, MAX_SANITIZED_BODY_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err((StatusCode::PAYLOAD_TOO_LARGE, "Request body is too large.").into_response())
        }
        Err(e) => {
            tracing::warn!("Failed to read request body: {}", e);
            Err((StatusCode::BAD_REQUEST, "Failed to read request body.").into_response())
        }
    }
}

/// Trims surrounding whitespace and removes control characters.
pub fn sanitize_string(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

/// Sanitizes every string value (not keys) of a JSON document in place.
pub fn sanitize_json(value: &mut Value) {
    match value {
        Value::String(s) => *s = sanitize_string(s),
        Value::Array(items) => items.iter_mut().for_each(sanitize_json),
        Value::Object(map) => map.values_mut().for_each(sanitize_json),
        _ => {}
    }
}

/// Returns a rewritten URI when any query value changed.
fn sanitize_uri(uri: &Uri) -> Option<Uri> {
    let query = uri.query()?;

    let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let cleaned: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| (k.clone(), sanitize_string(v)))
        .collect();

    if cleaned == pairs {
        return None;
    }

    let new_query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(&cleaned)
        .finish();
    let path_and_query = format!("{}?{}", uri.path(), new_query);

    let mut builder = Uri::builder().path_and_query(path_and_query);
    if let Some(scheme) = uri.scheme() {
        builder = builder.scheme(scheme.clone());
    }
    if let Some(authority) = uri.authority() {
        builder = builder.authority(authority.clone());
    }

    match builder.build() {
        Ok(uri) => Some(uri),
        Err(e) => {
            tracing::warn!("Failed to rebuild sanitized URI: {}", e);
            None
        }
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("application/json"))
}
