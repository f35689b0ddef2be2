//! S3-backed blob store.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use tracing::debug;

use super::aws::StoreConfig;
use crate::domain::BlobLocation;
use crate::domain::ports::{BlobStore, BlobStoreError};

fn map_sdk_error<E, R>(error: &SdkError<E, R>) -> BlobStoreError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match error {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            BlobStoreError::connection(format!("{error:?}"))
        }
        _ => BlobStoreError::query(DisplayErrorContext(error).to_string()),
    }
}

/// Whether a service error names a missing bucket.
fn names_missing_bucket<E, R>(error: &SdkError<E, R>) -> bool
where
    E: aws_sdk_s3::error::ProvideErrorMetadata,
{
    matches!(error, SdkError::ServiceError(service) if service.err().code() == Some("NoSuchBucket"))
}

/// [`BlobStore`] over S3 buckets.
#[derive(Clone, Debug)]
pub struct S3BlobStore {
    client: Client,
}

impl S3BlobStore {
    /// Build the adapter from the shared SDK configuration, applying the
    /// endpoint and path-style overrides from `config`.
    #[must_use]
    pub fn new(sdk_config: &SdkConfig, config: &StoreConfig) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config)
            .force_path_style(config.s3_force_path_style());
        if let Some(endpoint) = config.s3_endpoint() {
            builder = builder.endpoint_url(endpoint);
        }
        Self::from_client(Client::from_conf(builder.build()))
    }

    /// Store using an already configured client.
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Create `bucket` unless this account already owns it. Returns whether
    /// the bucket was created.
    ///
    /// # Errors
    ///
    /// Store failures, including a bucket name taken by another account.
    pub async fn ensure_bucket(&self, bucket: &str) -> Result<bool, BlobStoreError> {
        let mut request = self.client.create_bucket().bucket(bucket);
        let region = self.client.config().region().map(|region| region.as_ref().to_owned());
        if let Some(region) = region.filter(|region| region != "us-east-1") {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region.as_str()))
                    .build(),
            );
        }
        match request.send().await {
            Ok(_) => {
                debug!(bucket, "bucket created");
                Ok(true)
            }
            Err(SdkError::ServiceError(service))
                if matches!(service.err(), CreateBucketError::BucketAlreadyOwnedByYou(_)) =>
            {
                Ok(false)
            }
            Err(error) => Err(map_sdk_error(&error)),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn get(&self, location: &BlobLocation) -> Result<Option<Vec<u8>>, BlobStoreError> {
        let outcome = self
            .client
            .get_object()
            .bucket(location.bucket())
            .key(location.key())
            .send()
            .await;
        let output = match outcome {
            Ok(output) => output,
            Err(SdkError::ServiceError(service))
                if matches!(service.err(), GetObjectError::NoSuchKey(_)) =>
            {
                return Ok(None);
            }
            Err(error) if names_missing_bucket(&error) => {
                return Err(BlobStoreError::missing_bucket(location.bucket()));
            }
            Err(error) => return Err(map_sdk_error(&error)),
        };
        let body = output
            .body
            .collect()
            .await
            .map_err(|error| BlobStoreError::connection(error.to_string()))?;
        debug!(%location, "object read");
        Ok(Some(body.into_bytes().to_vec()))
    }

    async fn put(
        &self,
        location: &BlobLocation,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BlobStoreError> {
        let outcome = self
            .client
            .put_object()
            .bucket(location.bucket())
            .key(location.key())
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await;
        match outcome {
            Ok(_) => {
                debug!(%location, "object written");
                Ok(())
            }
            Err(error) if names_missing_bucket(&error) => {
                Err(BlobStoreError::missing_bucket(location.bucket()))
            }
            Err(error) => Err(map_sdk_error(&error)),
        }
    }

    async fn copy(&self, from: &BlobLocation, to: &BlobLocation) -> Result<(), BlobStoreError> {
        let outcome = self
            .client
            .copy_object()
            .copy_source(from.to_string())
            .bucket(to.bucket())
            .key(to.key())
            .send()
            .await;
        match outcome {
            Ok(_) => Ok(()),
            Err(SdkError::ServiceError(service))
                if service.err().meta().code() == Some("NoSuchKey") =>
            {
                Err(BlobStoreError::missing_object(from.to_string()))
            }
            Err(error) if names_missing_bucket(&error) => {
                Err(BlobStoreError::missing_bucket(to.bucket()))
            }
            Err(error) => Err(map_sdk_error(&error)),
        }
    }

    async fn list_buckets(&self) -> Result<Vec<String>, BlobStoreError> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|error| map_sdk_error(&error))?;
        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name().map(str::to_owned))
            .collect())
    }
}
