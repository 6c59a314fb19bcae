//! Image codec layer.
//!
//! The resize service treats image processing as an opaque capability behind
//! the [`ImageCodec`] trait: decode bytes into pixels, scale so the long side
//! matches a target, and encode back in the source's format.
//!
//! - [`RasterCodec`]: implementation on top of the `image` crate
//! - [`DecodedImage`]: pixels plus the format they were read from
//! - [`EncodedImage`]: encoded bytes plus their MIME type

mod raster;

pub use raster::{
    clamp_quality, is_valid_quality, DecodedImage, EncodedImage, ImageCodec, RasterCodec,
    DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY, SUPPORTED_FORMATS,
};
