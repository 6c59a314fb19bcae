use std::time::SystemTime;

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use futures::stream;
use tracing::debug;

use super::{BlobAttributes, BlobLocation, BlobStore, BlobStream, DEFAULT_CONTENT_TYPE};
use crate::error::IoError;

/// S3-backed implementation of `BlobStore`.
///
/// Works against AWS S3 and S3-compatible services (MinIO, GCS interoperability
/// endpoints). The bucket is taken from each `BlobLocation`, so one store
/// serves every source and derived bucket.
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
}

impl S3BlobStore {
    /// Create a new store around an existing S3 client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Get the underlying S3 client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Map an SDK failure to an `IoError`, recognizing missing objects.
///
/// `is_missing` carries the operation-specific service error check; the raw
/// status code and the error text are consulted as fallbacks, since some
/// S3-compatible services report 404 without a modeled error.
fn map_sdk_error<E>(err: SdkError<E>, location: &BlobLocation, is_missing: bool) -> IoError
where
    E: std::error::Error + Send + Sync + 'static,
{
    if is_missing {
        return IoError::NotFound(location.to_string());
    }

    let status_is_404 = err
        .raw_response()
        .map(|r| r.status().as_u16() == 404)
        .unwrap_or(false);
    if status_is_404 {
        return IoError::NotFound(location.to_string());
    }

    let err_str = DisplayErrorContext(&err).to_string();
    if err_str.contains("NotFound") || err_str.contains("NoSuchKey") {
        return IoError::NotFound(location.to_string());
    }

    IoError::S3(err_str)
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn attrs(&self, location: &BlobLocation) -> Result<BlobAttributes, IoError> {
        let head = self
            .client
            .head_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| {
                let is_missing = e
                    .as_service_error()
                    .map(|se| se.is_not_found())
                    .unwrap_or(false);
                map_sdk_error(e, location, is_missing)
            })?;

        let created = head
            .last_modified()
            .and_then(|dt| SystemTime::try_from(*dt).ok());

        Ok(BlobAttributes {
            created,
            size: head.content_length().unwrap_or(0).max(0) as u64,
            content_type: head
                .content_type()
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_string(),
        })
    }

    async fn read(&self, location: &BlobLocation) -> Result<Bytes, IoError> {
        let resp = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| {
                let is_missing = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false);
                map_sdk_error(e, location, is_missing)
            })?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| IoError::Connection(e.to_string()))?
            .into_bytes();

        debug!(location = %location, bytes = data.len(), "read object");
        Ok(data)
    }

    async fn stream(&self, location: &BlobLocation) -> Result<BlobStream, IoError> {
        let resp = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| {
                let is_missing = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false);
                map_sdk_error(e, location, is_missing)
            })?;

        let body = stream::unfold(resp.body, |mut body| async move {
            body.next()
                .await
                .map(|chunk| (chunk.map_err(|e| IoError::Connection(e.to_string())), body))
        });

        Ok(Box::pin(body))
    }

    async fn write(
        &self,
        location: &BlobLocation,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), IoError> {
        let len = data.len();
        self.client
            .put_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| IoError::S3(DisplayErrorContext(&e).to_string()))?;

        debug!(location = %location, bytes = len, "wrote object");
        Ok(())
    }
}

/// Create an S3 client with optional custom endpoint and region.
///
/// Use a custom endpoint for S3-compatible services like MinIO:
/// ```ignore
/// let client = create_s3_client(Some("http://localhost:9000"), "us-east-1").await;
/// ```
///
/// For AWS S3, pass `None` to use the default endpoint:
/// ```ignore
/// let client = create_s3_client(None, "us-east-1").await;
/// ```
pub async fn create_s3_client(endpoint_url: Option<&str>, region: &str) -> Client {
    let region = aws_config::Region::new(region.to_string());
    let mut config_loader =
        aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);

    if let Some(endpoint) = endpoint_url {
        config_loader = config_loader.endpoint_url(endpoint);
    }

    let sdk_config = config_loader.load().await;

    // S3-compatible services generally need path-style addressing
    let s3_config = if endpoint_url.is_some() {
        aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build()
    } else {
        aws_sdk_s3::config::Builder::from(&sdk_config).build()
    };

    Client::from_conf(s3_config)
}
