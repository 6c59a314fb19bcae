//! Response header assembly for served images.

use std::time::SystemTime;

use aws_sdk_s3::primitives::{DateTime, DateTimeFormat};
use http::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED};
use http::{HeaderMap, HeaderName, HeaderValue};

/// Diagnostic header reporting where the body came from.
pub const IMAGE_CACHE_HEADER: &str = "x-image-cache";

/// Where a served body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// The original object, no resize requested
    Source,
    /// A rendition that was already stored
    Hit,
    /// A rendition computed and stored for this request
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Source => "source",
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
        }
    }
}

/// Headers describing a served image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHeaders {
    /// `public, max-age=N` is emitted only when this is non-zero
    pub cache_control_max_age: u32,

    /// Creation time of the source object
    pub last_modified: Option<SystemTime>,

    /// Known body length; `None` for freshly encoded renditions
    pub content_length: Option<u64>,

    pub content_type: String,
}

impl ImageHeaders {
    /// Write the headers into `headers`.
    ///
    /// A header that is already present is left untouched, so applying two
    /// header sets never overwrites an earlier value with a conflicting one.
    pub fn apply(&self, headers: &mut HeaderMap) {
        if self.cache_control_max_age > 0 {
            let value = format!("public, max-age={}", self.cache_control_max_age);
            set_if_absent(headers, CACHE_CONTROL, &value);
        }
        if let Some(value) = self.last_modified.and_then(format_http_date) {
            set_if_absent(headers, LAST_MODIFIED, &value);
        }
        if let Some(len) = self.content_length {
            set_if_absent(headers, CONTENT_LENGTH, &len.to_string());
        }
        if !self.content_type.is_empty() {
            set_if_absent(headers, CONTENT_TYPE, &self.content_type);
        }
    }
}

fn set_if_absent(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    if headers.contains_key(&name) {
        return;
    }
    // Values come from store metadata; anything not representable is skipped
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

/// Format a timestamp as an HTTP-date (`Tue, 29 Apr 2014 18:30:38 GMT`).
pub fn format_http_date(time: SystemTime) -> Option<String> {
    DateTime::from(time).fmt(DateTimeFormat::HttpDate).ok()
}
