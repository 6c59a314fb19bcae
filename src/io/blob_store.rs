use std::fmt;
use std::pin::Pin;
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::error::IoError;

/// Content type reported when the store has none recorded for an object.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A boxed stream of object body chunks.
pub type BlobStream = Pin<Box<dyn Stream<Item = Result<Bytes, IoError>> + Send>>;

/// Address of a blob in the store: a (bucket, key) pair.
///
/// Identifies either a source object or a derived rendition. Locations are
/// computed per request and never persisted on their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobLocation {
    pub bucket: String,
    pub key: String,
}

impl BlobLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for BlobLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Metadata snapshot of a stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobAttributes {
    /// Creation (or last write) time reported by the store
    pub created: Option<SystemTime>,

    /// Object size in bytes
    pub size: u64,

    /// MIME type recorded with the object
    pub content_type: String,
}

/// Minimal object store interface used by the resize service.
///
/// Implementations must be thread-safe; a single store instance is shared by
/// every in-flight request.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch the metadata of a blob.
    ///
    /// Returns `IoError::NotFound` when the blob does not exist.
    async fn attrs(&self, location: &BlobLocation) -> Result<BlobAttributes, IoError>;

    /// Read the whole blob into memory.
    async fn read(&self, location: &BlobLocation) -> Result<Bytes, IoError>;

    /// Open a streaming read of the blob body.
    async fn stream(&self, location: &BlobLocation) -> Result<BlobStream, IoError>;

    /// Write a blob, replacing any existing object at the same location.
    async fn write(
        &self,
        location: &BlobLocation,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), IoError>;
}
