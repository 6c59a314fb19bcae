//! Naming convention for derived renditions.
//!
//! A rendition lives at a location computed purely from the source location
//! and the target size, so every request for the same rendition addresses the
//! same object:
//!
//! ```text
//! bucket: alter-{source bucket}     (or the configured override)
//! key:    {source key}_s{size}
//! ```
//!
//! With an override bucket configured, renditions from all source buckets
//! share one bucket. The derived key does not encode the source bucket, so
//! `a/cat.jpg` and `b/cat.jpg` resized to the same size collide there.

use crate::io::BlobLocation;

/// Prefix prepended to the source bucket when no override is configured.
pub const ALTERED_BUCKET_PREFIX: &str = "alter-";

/// Separator between the source key and the size in derived keys.
pub const ALTERED_KEY_SEPARATOR: &str = "_s";

/// Where derived renditions are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingConfig {
    /// Single bucket for every derived rendition; `None` uses the
    /// `alter-{bucket}` rule
    pub alter_bucket: Option<String>,
}

impl NamingConfig {
    /// Use the default `alter-{bucket}` rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store every rendition in one fixed bucket.
    pub fn with_alter_bucket(bucket: impl Into<String>) -> Self {
        Self {
            alter_bucket: Some(bucket.into()),
        }
    }

    /// Bucket holding renditions of objects from `source_bucket`.
    pub fn altered_bucket(&self, source_bucket: &str) -> String {
        match &self.alter_bucket {
            Some(bucket) => bucket.clone(),
            None => default_altered_bucket(source_bucket),
        }
    }

    /// Location of the rendition of `source` at `size`.
    pub fn altered_location(&self, source: &BlobLocation, size: u32) -> BlobLocation {
        BlobLocation::new(
            self.altered_bucket(&source.bucket),
            altered_key(&source.key, size),
        )
    }
}

/// Default derived bucket name: `alter-{source_bucket}`.
pub fn default_altered_bucket(source_bucket: &str) -> String {
    format!("{}{}", ALTERED_BUCKET_PREFIX, source_bucket)
}

/// Derived object key: `{source_key}_s{size}`.
pub fn altered_key(source_key: &str, size: u32) -> String {
    format!("{}{}{}", source_key, ALTERED_KEY_SEPARATOR, size)
}
