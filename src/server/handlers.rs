//! HTTP request handlers for the image API.
//!
//! # Endpoints
//!
//! - `GET /{version}/{bucket}/{object}[/=s{N}]` - Serve an image
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::{stream, TryStreamExt};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::codec::ImageCodec;
use crate::error::{IoError, ServeError, ValidationError};
use crate::io::BlobStore;
use crate::resize::{ImageBody, RequestOption, ResizeService, ServedImage, IMAGE_CACHE_HEADER};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the resize service.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<B: BlobStore, C: ImageCodec> {
    /// The service resolving requests to originals or renditions
    pub resize_service: Arc<ResizeService<B, C>>,

    /// Cache-Control max-age in seconds applied to every image response
    pub cache_max_age: u32,
}

impl<B: BlobStore, C: ImageCodec> AppState<B, C> {
    /// Create a new application state with the default 1 hour max-age.
    pub fn new(resize_service: ResizeService<B, C>) -> Self {
        Self::with_cache_max_age(resize_service, 3600)
    }

    /// Create a new application state with custom cache max-age.
    pub fn with_cache_max_age(resize_service: ResizeService<B, C>, cache_max_age: u32) -> Self {
        Self {
            resize_service: Arc::new(resize_service),
            cache_max_age,
        }
    }
}

impl<B: BlobStore, C: ImageCodec> Clone for AppState<B, C> {
    fn clone(&self) -> Self {
        Self {
            resize_service: Arc::clone(&self.resize_service),
            cache_max_age: self.cache_max_age,
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Error returned by the image handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Serve(#[from] ServeError),
}

/// Convert ValidationError to a 400 response with a short plain-text reason.
///
/// Bad input is the client's problem, so it is only logged at DEBUG.
impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        debug!(error = %self, "rejected request path");

        let reason = match &self {
            ValidationError::InvalidArgument { .. } => "invalid argument".to_string(),
            ValidationError::MalformedSize { .. } => "invalid resize argument".to_string(),
            ValidationError::ResizeOutOfRange { .. } => self.to_string(),
        };

        (StatusCode::BAD_REQUEST, reason).into_response()
    }
}

/// Convert ServeError to HTTP response.
///
/// - Missing sources are common and logged at INFO (404)
/// - Storage and codec failures are logged at ERROR with the blob and size,
///   and answered with an empty 500 so internals never leak to clients
impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        match &self {
            ServeError::NotFound { bucket, key } => {
                info!(bucket = %bucket, key = %key, "source object not found");
                (StatusCode::NOT_FOUND, "not found").into_response()
            }
            ServeError::Storage {
                bucket,
                key,
                size,
                source,
            } => {
                error!(
                    bucket = %bucket,
                    key = %key,
                    size = size,
                    error = %source,
                    "storage failure while serving image"
                );
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            ServeError::Codec {
                bucket,
                key,
                size,
                source,
            } => {
                error!(
                    bucket = %bucket,
                    key = %key,
                    size = size,
                    error = %source,
                    "codec failure while serving image"
                );
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::Validation(err) => err.into_response(),
            HandlerError::Serve(err) => err.into_response(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle image requests.
///
/// # Endpoint
///
/// `GET /{version}/{bucket}/{object}` or `GET /{version}/{bucket}/{object}/=s{N}`
///
/// The version segment is matched by the router; everything after it is
/// parsed into a [`RequestOption`].
///
/// # Response
///
/// `200 OK` with the image body and `content-type`, `cache-control`,
/// `last-modified` and (for stored objects) `content-length` headers.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed path or resize argument out of range
/// - `404 Not Found`: Source object does not exist
/// - `500 Internal Server Error`: Storage or codec failure
pub async fn image_handler<B, C>(
    State(state): State<AppState<B, C>>,
    Path(path): Path<String>,
) -> Result<Response, HandlerError>
where
    B: BlobStore + 'static,
    C: ImageCodec + 'static,
{
    let option =
        RequestOption::parse(&format!("/{}", path))?.with_cache_max_age(state.cache_max_age);

    let served = state.resize_service.serve(&option).await?;

    Ok(image_response(served, &option))
}

/// Handle `GET /{version}/` with no object path.
///
/// Always a `400 Bad Request`, matching what the image handler answers for
/// any path that lacks a bucket or object.
pub async fn empty_path_handler() -> Response {
    ValidationError::InvalidArgument {
        reason: "expected /{bucket}/{object}".to_string(),
    }
    .into_response()
}

/// Build the HTTP response for a served image.
fn image_response(served: ServedImage, option: &RequestOption) -> Response {
    let mut headers = HeaderMap::new();
    served.headers.apply(&mut headers);
    headers.insert(
        IMAGE_CACHE_HEADER,
        HeaderValue::from_static(served.cache.as_str()),
    );

    let bucket = option.bucket.clone();
    let key = option.key.clone();
    let size = option.size;

    let body = match served.body {
        ImageBody::Stream(body) => {
            // Headers are already sent by the time a chunk fails; log only
            Body::from_stream(body.inspect_err(move |e| {
                error!(
                    bucket = %bucket,
                    key = %key,
                    size = size,
                    error = %e,
                    "failed to stream image body"
                );
            }))
        }
        // Sent as a stream so no length is advertised for fresh renditions
        ImageBody::Rendered(data) => Body::from_stream(stream::once(async move {
            Ok::<_, IoError>(data)
        })),
    };

    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::OK;
    *response.headers_mut() = headers;
    response
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
