//! # image-serve
//!
//! An on-demand image resizing server for images stored in S3-compatible
//! object storage.
//!
//! Requests name a source object and, optionally, a target size for its long
//! side. Originals are streamed straight from the store. Resized renditions
//! are computed on first request, written back to the store under a
//! deterministic name, and served from there on every later request.
//!
//! ## Features
//!
//! - **Read-through rendition cache**: the object store itself holds every
//!   rendition, so replicas share work without coordination
//! - **Format preserving**: JPEG, PNG, GIF and WebP are decoded and
//!   re-encoded in their own format
//! - **Legacy URL scheme**: `/{version}/{bucket}/{object}/=s{N}`
//!
//! ## Architecture
//!
//! - [`io`] - Object store abstraction and the S3 implementation
//! - [`codec`] - Image decode, resize and encode
//! - [`resize`] - Request parsing, rendition naming and the resize service
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use image_serve::{create_router, create_s3_client, NamingConfig, RasterCodec, ResizeService, RouterConfig, S3BlobStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = create_s3_client(Some("http://localhost:9000"), "us-east-1").await;
//!     let service = ResizeService::new(
//!         S3BlobStore::new(client),
//!         RasterCodec::new(),
//!         NamingConfig::new(),
//!     );
//!
//!     let router = create_router(service, RouterConfig::new());
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod io;
pub mod resize;
pub mod server;

// Re-export commonly used types
pub use codec::{
    clamp_quality, is_valid_quality, DecodedImage, EncodedImage, ImageCodec, RasterCodec,
    DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
pub use config::{CheckConfig, Cli, Command, ServeConfig};
pub use error::{CodecError, IoError, ServeError, ValidationError};
pub use io::{
    create_s3_client, BlobAttributes, BlobLocation, BlobStore, BlobStream, S3BlobStore,
};
pub use resize::{
    altered_key, CacheStatus, ImageBody, ImageHeaders, NamingConfig, RequestOption,
    ResizeService, ServedImage, IMAGE_CACHE_HEADER, MAX_RESIZE_SIZE, MIN_RESIZE_SIZE,
};
pub use server::{
    create_router, health_handler, image_handler, AppState, HandlerError, HealthResponse,
    RouterConfig,
};
