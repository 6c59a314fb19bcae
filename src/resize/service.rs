//! Read-through resize service.
//!
//! The ResizeService is the main entry point for image requests. It decides
//! which blob to serve, producing and storing a rendition when it is missing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          ResizeService                           │
//! │  ┌────────────────────────────────────────────────────────────┐  │
//! │  │                         serve()                            │  │
//! │  │  1. Check source         3. Check rendition                │  │
//! │  │  2. size 0: stream       4. hit: stream | miss: render,    │  │
//! │  │     the source              store and serve the bytes      │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! │           │                      │                     │         │
//! │           ▼                      ▼                     ▼         │
//! │    ┌─────────────┐      ┌──────────────┐      ┌──────────────┐   │
//! │    │ NamingConfig│      │  BlobStore   │      │  ImageCodec  │   │
//! │    └─────────────┘      └──────────────┘      └──────────────┘   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Concurrent misses for the same rendition are not coalesced. Each one
//! renders the same bytes and writes them to the same key, so the store
//! simply keeps the last write.

use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use tracing::{debug, info};

use crate::codec::{EncodedImage, ImageCodec};
use crate::error::{CodecError, IoError, ServeError};
use crate::io::{BlobAttributes, BlobLocation, BlobStore, BlobStream};

use super::headers::{CacheStatus, ImageHeaders};
use super::naming::NamingConfig;
use super::request::RequestOption;

// =============================================================================
// Served Image
// =============================================================================

/// Body of a served image.
pub enum ImageBody {
    /// Streamed from a stored object
    Stream(BlobStream),

    /// Rendered for this request; the same bytes were written to the store
    Rendered(Bytes),
}

impl ImageBody {
    /// Collect the whole body into memory.
    pub async fn collect(self) -> Result<Bytes, IoError> {
        match self {
            ImageBody::Rendered(data) => Ok(data),
            ImageBody::Stream(stream) => {
                let chunks: Vec<Bytes> = stream.try_collect().await?;
                Ok(Bytes::from(chunks.concat()))
            }
        }
    }
}

impl std::fmt::Debug for ImageBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageBody::Stream(_) => f.write_str("ImageBody::Stream"),
            ImageBody::Rendered(data) => write!(f, "ImageBody::Rendered({} bytes)", data.len()),
        }
    }
}

/// Result of a successful `serve` call.
#[derive(Debug)]
pub struct ServedImage {
    pub headers: ImageHeaders,
    pub body: ImageBody,
    pub cache: CacheStatus,
}

// =============================================================================
// Resize Service
// =============================================================================

/// Service serving originals and cached renditions from a blob store.
///
/// Holds no per-request state; all durable state lives in the store.
///
/// # Type Parameters
///
/// * `B` - The blob store (e.g. [`crate::io::S3BlobStore`])
/// * `C` - The image codec (e.g. [`crate::codec::RasterCodec`])
///
/// # Example
///
/// ```ignore
/// use image_serve::resize::{NamingConfig, RequestOption, ResizeService};
///
/// let service = ResizeService::new(store, RasterCodec::new(), NamingConfig::new());
///
/// let option = RequestOption::parse("/photos/cat.jpg/=s200")?.with_cache_max_age(3600);
/// let served = service.serve(&option).await?;
/// ```
pub struct ResizeService<B: BlobStore, C: ImageCodec> {
    store: Arc<B>,
    codec: Arc<C>,
    naming: NamingConfig,
}

impl<B, C> ResizeService<B, C>
where
    B: BlobStore,
    C: ImageCodec + 'static,
{
    /// Create a new resize service.
    pub fn new(store: B, codec: C, naming: NamingConfig) -> Self {
        Self::with_shared(Arc::new(store), Arc::new(codec), naming)
    }

    /// Create a resize service around a store and codec shared with others.
    pub fn with_shared(store: Arc<B>, codec: Arc<C>, naming: NamingConfig) -> Self {
        Self {
            store,
            codec,
            naming,
        }
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &Arc<B> {
        &self.store
    }

    /// Get the naming configuration.
    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }

    /// Serve the image described by `option`.
    ///
    /// # Errors
    ///
    /// - [`ServeError::NotFound`] if the source object does not exist
    /// - [`ServeError::Storage`] if any store request fails
    /// - [`ServeError::Codec`] if the source cannot be decoded or the
    ///   rendition cannot be encoded
    pub async fn serve(&self, option: &RequestOption) -> Result<ServedImage, ServeError> {
        let source = option.source_location();

        let source_attrs = match self.store.attrs(&source).await {
            Ok(attrs) => attrs,
            Err(IoError::NotFound(_)) => {
                return Err(ServeError::NotFound {
                    bucket: option.bucket.clone(),
                    key: option.key.clone(),
                });
            }
            Err(e) => return Err(storage_error(&source, option.size, e)),
        };

        if !option.is_resize() {
            let body = self
                .store
                .stream(&source)
                .await
                .map_err(|e| storage_error(&source, option.size, e))?;

            return Ok(ServedImage {
                headers: ImageHeaders {
                    cache_control_max_age: option.cache_max_age,
                    last_modified: source_attrs.created,
                    content_length: Some(source_attrs.size),
                    content_type: source_attrs.content_type,
                },
                body: ImageBody::Stream(body),
                cache: CacheStatus::Source,
            });
        }

        let derived = self.naming.altered_location(&source, option.size);

        match self.store.attrs(&derived).await {
            Ok(derived_attrs) => {
                self.serve_stored(option, &source_attrs, &derived, derived_attrs)
                    .await
            }
            Err(IoError::NotFound(_)) => {
                self.serve_rendered(option, &source_attrs, &source, &derived)
                    .await
            }
            Err(e) => Err(storage_error(&derived, option.size, e)),
        }
    }

    /// Stream a rendition that is already in the store.
    async fn serve_stored(
        &self,
        option: &RequestOption,
        source_attrs: &BlobAttributes,
        derived: &BlobLocation,
        derived_attrs: BlobAttributes,
    ) -> Result<ServedImage, ServeError> {
        debug!(location = %derived, size = option.size, "rendition cache hit");

        let body = self
            .store
            .stream(derived)
            .await
            .map_err(|e| storage_error(derived, option.size, e))?;

        Ok(ServedImage {
            headers: ImageHeaders {
                cache_control_max_age: option.cache_max_age,
                // Freshness follows the source, not the cache entry
                last_modified: source_attrs.created,
                content_length: Some(derived_attrs.size),
                content_type: derived_attrs.content_type,
            },
            body: ImageBody::Stream(body),
            cache: CacheStatus::Hit,
        })
    }

    /// Render a missing rendition, store it and serve the stored bytes.
    async fn serve_rendered(
        &self,
        option: &RequestOption,
        source_attrs: &BlobAttributes,
        source: &BlobLocation,
        derived: &BlobLocation,
    ) -> Result<ServedImage, ServeError> {
        debug!(location = %derived, size = option.size, "rendition cache miss");

        let rendered = self.render(source, option.size).await?;

        self.store
            .write(derived, rendered.data.clone(), rendered.content_type)
            .await
            .map_err(|e| storage_error(derived, option.size, e))?;

        info!(
            source = %source,
            location = %derived,
            size = option.size,
            bytes = rendered.data.len(),
            "stored rendition"
        );

        Ok(ServedImage {
            headers: ImageHeaders {
                cache_control_max_age: option.cache_max_age,
                last_modified: source_attrs.created,
                // Not known until encoding finished; left to the transport
                content_length: None,
                content_type: rendered.content_type.to_string(),
            },
            body: ImageBody::Rendered(rendered.data),
            cache: CacheStatus::Miss,
        })
    }

    /// Read the source and produce its rendition at `size` without storing it.
    ///
    /// Decoding, resizing and encoding run on the blocking thread pool.
    pub async fn render(
        &self,
        source: &BlobLocation,
        size: u32,
    ) -> Result<EncodedImage, ServeError> {
        let data = self
            .store
            .read(source)
            .await
            .map_err(|e| storage_error(source, size, e))?;

        let codec = Arc::clone(&self.codec);
        let encoded = tokio::task::spawn_blocking(move || {
            let decoded = codec.decode(&data)?;
            let resized = codec.resize_to_fit_long_side(decoded, size);
            codec.encode(&resized)
        })
        .await
        .map_err(|e| CodecError::Aborted(e.to_string()))
        .and_then(|result| result);

        encoded.map_err(|e| ServeError::Codec {
            bucket: source.bucket.clone(),
            key: source.key.clone(),
            size,
            source: e,
        })
    }
}

fn storage_error(location: &BlobLocation, size: u32, source: IoError) -> ServeError {
    ServeError::Storage {
        bucket: location.bucket.clone(),
        key: location.key.clone(),
        size,
        source,
    }
}

// =============================================================================
// Tests
// =============================================================================
