//! Object store layer.
//!
//! - [`BlobStore`]: async trait over whole-object reads, streaming reads,
//!   metadata lookups and writes
//! - [`S3BlobStore`]: implementation for S3 and S3-compatible services

mod blob_store;
mod s3_store;

pub use blob_store::{BlobAttributes, BlobLocation, BlobStore, BlobStream, DEFAULT_CONTENT_TYPE};
pub use s3_store::{create_s3_client, S3BlobStore};
