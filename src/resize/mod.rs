//! Read-through resize cache.
//!
//! This module turns a request path into a served image, keeping resized
//! renditions in the object store next to their sources.
//!
//! # Architecture
//!
//! The resize service sits between the HTTP layer and the object store:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │  RequestOption::parse
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             ResizeService               │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │ NamingConfig │  │   ImageCodec    │  │
//! │  │ (rendition   │  │  (decode →      │  │
//! │  │  locations)  │  │  resize → enc.) │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │               BlobStore                 │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`RequestOption`]: parsed request (bucket, key, size, cache max-age)
//! - [`NamingConfig`]: where renditions are stored
//! - [`ResizeService`]: decides hit, miss or original and produces the body
//! - [`ImageHeaders`]: response headers with set-if-absent semantics
//!
//! # Example
//!
//! ```
//! use image_serve::resize::{altered_key, NamingConfig, RequestOption};
//!
//! let option = RequestOption::parse("/photos/cat.jpg/=s200").unwrap();
//! assert_eq!(option.size, 200);
//!
//! let naming = NamingConfig::new();
//! let rendition = naming.altered_location(&option.source_location(), option.size);
//! assert_eq!(rendition.bucket, "alter-photos");
//! assert_eq!(rendition.key, altered_key("cat.jpg", 200));
//! ```

mod headers;
mod naming;
mod request;
mod service;

pub use headers::{format_http_date, CacheStatus, ImageHeaders, IMAGE_CACHE_HEADER};
pub use naming::{
    altered_key, default_altered_bucket, NamingConfig, ALTERED_BUCKET_PREFIX,
    ALTERED_KEY_SEPARATOR,
};
pub use request::{RequestOption, MAX_RESIZE_SIZE, MIN_RESIZE_SIZE};
pub use service::{ImageBody, ResizeService, ServedImage};
