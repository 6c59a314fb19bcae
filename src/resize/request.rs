//! Request path parsing.
//!
//! Paths follow the legacy image-serving URL scheme, with the API version
//! segment already consumed by the router:
//!
//! ```text
//! /{bucket}/{object}          original object
//! /{bucket}/{object}/=s{N}    long side resized to N pixels
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;
use crate::io::BlobLocation;

/// Smallest accepted resize argument (0 means "no resize").
pub const MIN_RESIZE_SIZE: u32 = 0;

/// Resize arguments must be strictly below this bound.
pub const MAX_RESIZE_SIZE: u32 = 2560;

static SIZE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"=s(\d+)").expect("resize marker pattern is valid"));

/// A parsed image request.
///
/// Built once per request by [`RequestOption::parse`] and never mutated by the
/// service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOption {
    /// Bucket holding the source object
    pub bucket: String,

    /// Source object key
    pub key: String,

    /// Target long-side size in pixels, 0 for the original
    pub size: u32,

    /// Cache-Control max-age in seconds; set by the server, never by the path
    pub cache_max_age: u32,
}

impl RequestOption {
    /// Create an option for the given object and size.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, size: u32) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            size,
            cache_max_age: 0,
        }
    }

    /// Parse a request path of the form `/{bucket}/{object}[/=sN]`.
    ///
    /// A path with only a bucket and an object is a request for the original.
    /// When more segments follow, the last `=s{digits}` marker anywhere in the
    /// path determines the size; a path with extra segments and no marker is
    /// rejected.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::InvalidArgument`] for missing or empty segments,
    ///   or trailing segments without a resize marker
    /// - [`ValidationError::MalformedSize`] when the marker digits are not an
    ///   integer
    /// - [`ValidationError::ResizeOutOfRange`] when the size is not in
    ///   `[MIN_RESIZE_SIZE, MAX_RESIZE_SIZE)`
    pub fn parse(path: &str) -> Result<Self, ValidationError> {
        // A leading slash yields an empty first block
        let blocks: Vec<&str> = path.split('/').collect();
        if blocks.len() < 3 {
            return Err(ValidationError::InvalidArgument {
                reason: "expected /{bucket}/{object}".to_string(),
            });
        }

        let bucket = blocks[1];
        let key = blocks[2];
        if bucket.is_empty() || key.is_empty() {
            return Err(ValidationError::InvalidArgument {
                reason: "bucket and object must not be empty".to_string(),
            });
        }

        if blocks.len() < 4 {
            return Ok(Self::new(bucket, key, 0));
        }

        let digits = SIZE_MARKER
            .captures_iter(path)
            .last()
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| ValidationError::InvalidArgument {
                reason: "unrecognized path suffix".to_string(),
            })?;

        let size: u64 = digits
            .parse()
            .map_err(|_| ValidationError::MalformedSize {
                digits: digits.to_string(),
            })?;

        if size >= MAX_RESIZE_SIZE as u64 {
            return Err(ValidationError::ResizeOutOfRange {
                size,
                min: MIN_RESIZE_SIZE,
                max: MAX_RESIZE_SIZE,
            });
        }

        Ok(Self::new(bucket, key, size as u32))
    }

    /// Set the Cache-Control max-age to advertise for this request.
    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    /// Whether a resized rendition was requested.
    pub fn is_resize(&self) -> bool {
        self.size > 0
    }

    /// Location of the source object.
    pub fn source_location(&self) -> BlobLocation {
        BlobLocation::new(&self.bucket, &self.key)
    }
}
