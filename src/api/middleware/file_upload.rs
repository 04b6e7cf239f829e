//! Multipart upload guard and helpers for working with uploaded files.
//!
//! [`FileUploadGuard`] buffers every part of a `multipart/form-data` body in
//! memory and attaches the result to the request as an [`UploadedFiles`]
//! extension. Handlers read it back with `Extension<UploadedFiles>` and pick
//! files with [`get_file_with_field`].
//!
//! [`FileUploadGuard::into_layer`] lifts axum's default 2 MB body limit
//! outside the guard, so the per-part limit is the only one that applies.

use axum::{
    body::{Body, Bytes},
    extract::{
        DefaultBodyLimit, FromRequest, Multipart, Request, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{HeaderMap, StatusCode, header},
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;
use tower::ServiceBuilder;

use super::layer::MiddlewareLayer;

pub const BYTES_PER_MEGABYTE: u64 = 1_048_576;

/// A file part of a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub field_name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub buffer: Bytes,
    pub size: usize,
}

/// Everything parsed from a multipart body, in body order.
///
/// Parts with a file name are files; all other parts are text fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadedFiles {
    pub files: Vec<UploadedFile>,
    pub fields: Vec<(String, String)>,
}

impl UploadedFiles {
    /// First text field with the given name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("The uploaded file is larger than the size limit of {limit_mb} megabytes.")]
    SizeLimitExceeded { limit_mb: u64 },

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Rejection(#[from] MultipartRejection),
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        match self {
            UploadError::SizeLimitExceeded { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()).into_response()
            }
            UploadError::Multipart(e) => (e.status(), e.body_text()).into_response(),
            UploadError::Rejection(r) => r.into_response(),
        }
    }
}

/// Rejects multipart requests with a part above the configured size.
#[derive(Debug, Clone, Copy)]
pub struct FileUploadGuard {
    limit_mb: u64,
}

impl FileUploadGuard {
    pub fn new(limit_mb: u64) -> Self {
        Self { limit_mb }
    }

    pub fn limit_mb(&self) -> u64 {
        self.limit_mb
    }

    /// The guard together with a lifted default body limit.
    pub fn into_layer(self) -> MiddlewareLayer {
        MiddlewareLayer::new(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::disable())
                .layer(from_fn_with_state(self, layer)),
        )
    }

    fn limit_bytes(&self) -> u64 {
        self.limit_mb.saturating_mul(BYTES_PER_MEGABYTE)
    }

    /// Reads the whole multipart body and returns the request with an empty
    /// body and the parsed parts attached.
    async fn collect(&self, req: Request) -> Result<Request, UploadError> {
        let (mut parts, body) = req.into_parts();

        // Extensions carry the body limit set by `DefaultBodyLimit`.
        let mut body_req = Request::new(body);
        *body_req.headers_mut() = parts.headers.clone();
        *body_req.extensions_mut() = parts.extensions.clone();

        let mut multipart = Multipart::from_request(body_req, &()).await?;
        let limit = self.limit_bytes();
        let mut uploaded = UploadedFiles::default();

        while let Some(mut field) = multipart.next_field().await? {
            let field_name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);

            let mut buffer: Vec<u8> = Vec::new();
            while let Some(chunk) = field.chunk().await? {
                if (buffer.len() + chunk.len()) as u64 > limit {
                    return Err(UploadError::SizeLimitExceeded {
                        limit_mb: self.limit_mb,
                    });
                }
                buffer.extend_from_slice(&chunk);
            }

            if file_name.is_some() {
                uploaded.files.push(UploadedFile {
                    field_name,
                    file_name,
                    content_type,
                    size: buffer.len(),
                    buffer: Bytes::from(buffer),
                });
            } else {
                let value = String::from_utf8_lossy(&buffer).into_owned();
                uploaded.fields.push((field_name, value));
            }
        }

        tracing::debug!(
            files = uploaded.files.len(),
            fields = uploaded.fields.len(),
            "Multipart body parsed"
        );

        parts.headers.remove(header::CONTENT_LENGTH);
        let mut req = Request::from_parts(parts, Body::empty());
        req.extensions_mut().insert(uploaded);
        Ok(req)
    }
}

/// Buffers a multipart body into an [`UploadedFiles`] extension.
///
/// Requests that are not `multipart/form-data` pass through with an empty
/// [`UploadedFiles`].
///
/// # Errors
///
/// Answers `413 Payload Too Large` when any part exceeds the guard's limit,
/// and forwards axum's multipart errors for malformed bodies.
pub async fn layer(
    State(guard): State<FileUploadGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, UploadError> {
    if !is_multipart(req.headers()) {
        req.extensions_mut().insert(UploadedFiles::default());
        return Ok(next.run(req).await);
    }

    let req = guard.collect(req).await.inspect_err(|e| match e {
        UploadError::SizeLimitExceeded { limit_mb } => {
            tracing::warn!(limit_mb, "Upload rejected: part too large");
        }
        _ => tracing::warn!("Upload failed: {}", e),
    })?;

    Ok(next.run(req).await)
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"))
}

/// Returns the first uploaded file whose field name matches `field`.
pub fn get_file_with_field<'a>(files: &'a UploadedFiles, field: &str) -> Option<&'a UploadedFile> {
    files.files.iter().find(|f| f.field_name == field)
}

/// Writes `buffer` to a new, uniquely named file in the system temp directory
/// and returns its path.
///
/// The write is synchronous; call it from `spawn_blocking` inside async code.
/// The file is not removed automatically.
///
/// # Errors
///
/// Returns any I/O error raised while creating, writing or keeping the file.
pub fn create_temp_file_from_buffer(buffer: &[u8]) -> io::Result<PathBuf> {
    let mut file = tempfile::Builder::new().prefix("upload-").tempfile()?;
    file.write_all(buffer)?;
    file.flush()?;

    let (_, path) = file.keep()?;
    Ok(path)
}
