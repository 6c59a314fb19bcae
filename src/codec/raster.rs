//! Raster image codec built on the `image` crate.
//!
//! # Design Decisions
//!
//! - **Format preserving**: a rendition is always encoded in the format its
//!   source was decoded from, so `photo.png_s200` is still a PNG.
//!
//! - **Long-side fit**: resizing scales the image so its longer dimension
//!   equals the target, keeping the aspect ratio. Smaller images are scaled up.
//!
//! - **Quality control**: JPEG output quality is configured once per codec
//!   rather than per request.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};

use crate::error::CodecError;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Formats the codec can both decode and encode.
pub const SUPPORTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

// =============================================================================
// Image Types
// =============================================================================

/// A decoded image together with the format it was read from.
///
/// Lives only for the duration of one resize; never shared between requests.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Pixel buffer
    pub image: DynamicImage,

    /// Source encoding, reused when the image is encoded again
    pub format: ImageFormat,
}

impl DecodedImage {
    /// MIME type of the source encoding.
    pub fn content_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// Encoded image bytes ready to be stored or served.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Bytes,
    pub content_type: &'static str,
}

// =============================================================================
// Codec Trait
// =============================================================================

/// Decode, resize and encode capability used by the resize service.
///
/// Methods are synchronous and CPU-bound; callers run them on a blocking
/// thread.
pub trait ImageCodec: Send + Sync {
    /// Decode raw bytes, detecting the format from the content.
    fn decode(&self, data: &[u8]) -> Result<DecodedImage, CodecError>;

    /// Scale the image so its longer side equals `size`, preserving aspect ratio.
    fn resize_to_fit_long_side(&self, image: DecodedImage, size: u32) -> DecodedImage;

    /// Encode the image in its own format.
    fn encode(&self, image: &DecodedImage) -> Result<EncodedImage, CodecError>;
}

// =============================================================================
// Raster Codec
// =============================================================================

/// `ImageCodec` implementation for JPEG, PNG, GIF and WebP.
///
/// # Example
///
/// ```ignore
/// use image_serve::codec::{ImageCodec, RasterCodec};
///
/// let codec = RasterCodec::new();
/// let decoded = codec.decode(&source_bytes)?;
/// let resized = codec.resize_to_fit_long_side(decoded, 200);
/// let output = codec.encode(&resized)?;
/// ```
#[derive(Debug, Clone)]
pub struct RasterCodec {
    jpeg_quality: u8,
}

impl Default for RasterCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterCodec {
    /// Create a codec with the default JPEG quality.
    pub fn new() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Create a codec with a specific JPEG quality (clamped to 1-100).
    pub fn with_jpeg_quality(quality: u8) -> Self {
        Self {
            jpeg_quality: clamp_quality(quality),
        }
    }

    /// JPEG quality used when encoding.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }
}

impl ImageCodec for RasterCodec {
    fn decode(&self, data: &[u8]) -> Result<DecodedImage, CodecError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode {
                message: e.to_string(),
            })?;

        let format = reader.format().ok_or_else(|| CodecError::UnsupportedFormat {
            reason: "unrecognized image data".to_string(),
        })?;

        if !SUPPORTED_FORMATS.contains(&format) {
            return Err(CodecError::UnsupportedFormat {
                reason: format!("{:?} is not supported", format),
            });
        }

        let image = reader.decode().map_err(|e| CodecError::Decode {
            message: e.to_string(),
        })?;

        Ok(DecodedImage { image, format })
    }

    fn resize_to_fit_long_side(&self, image: DecodedImage, size: u32) -> DecodedImage {
        if size == 0 {
            return image;
        }

        DecodedImage {
            image: image.image.resize(size, size, FilterType::Lanczos3),
            format: image.format,
        }
    }

    fn encode(&self, image: &DecodedImage) -> Result<EncodedImage, CodecError> {
        let mut output = Vec::new();

        match image.format {
            ImageFormat::Jpeg => {
                // Alpha, if any, is dropped by the JPEG encoder
                let mut encoder = JpegEncoder::new_with_quality(&mut output, self.jpeg_quality);
                encoder
                    .encode_image(&image.image)
                    .map_err(|e| CodecError::Encode {
                        message: e.to_string(),
                    })?;
            }
            format => {
                image
                    .image
                    .write_to(&mut Cursor::new(&mut output), format)
                    .map_err(|e| CodecError::Encode {
                        message: e.to_string(),
                    })?;
            }
        }

        Ok(EncodedImage {
            data: Bytes::from(output),
            content_type: image.content_type(),
        })
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Validate JPEG quality parameter.
///
/// Returns `true` if quality is in the valid range (1-100).
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}

/// Clamp quality to valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================
