use thiserror::Error;

/// I/O errors that can occur when talking to the object store
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Error from S3 or S3-compatible storage
    #[error("S3 error: {0}")]
    S3(String),

    /// Network or connection error while transferring an object body
    #[error("Connection error: {0}")]
    Connection(String),

    /// Object not found
    #[error("Object not found: {0}")]
    NotFound(String),
}

impl IoError {
    /// Whether this error means the object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, IoError::NotFound(_))
    }
}

/// Errors from decoding, resizing or encoding an image
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// The bytes are not in a format the codec can read or write
    #[error("Unsupported image format: {reason}")]
    UnsupportedFormat { reason: String },

    /// Source bytes could not be decoded
    #[error("Failed to decode image: {message}")]
    Decode { message: String },

    /// Resized image could not be encoded
    #[error("Failed to encode image: {message}")]
    Encode { message: String },

    /// The blocking codec task panicked or was cancelled
    #[error("Codec task aborted: {0}")]
    Aborted(String),
}

/// Client input errors raised while parsing a request path.
///
/// These are never operational failures; they map to HTTP 400.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Path is missing a bucket or object segment, or carries an
    /// unrecognized suffix
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// The digits after `=s` do not form an integer
    #[error("invalid resize argument: {digits:?} is not a number")]
    MalformedSize { digits: String },

    /// The resize argument is outside the supported range
    #[error("Size ranges from {min} to {max}")]
    ResizeOutOfRange { size: u64, min: u32, max: u32 },
}

/// Errors returned by the read-through resize service.
///
/// Every internal variant carries the blob identity and target size so the
/// HTTP layer can log a single line without re-deriving context.
#[derive(Debug, Clone, Error)]
pub enum ServeError {
    /// The source object does not exist
    #[error("source object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// An object store request failed
    #[error("storage failure for {bucket}/{key} (size {size}): {source}")]
    Storage {
        bucket: String,
        key: String,
        size: u32,
        #[source]
        source: IoError,
    },

    /// Decoding, resizing or encoding failed
    #[error("codec failure for {bucket}/{key} (size {size}): {source}")]
    Codec {
        bucket: String,
        key: String,
        size: u32,
        #[source]
        source: CodecError,
    },
}

impl ServeError {
    /// Whether this error is an unexpected internal fault (HTTP 500).
    pub fn is_internal(&self) -> bool {
        !matches!(self, ServeError::NotFound { .. })
    }
}
