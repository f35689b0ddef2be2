//! Port for named byte blobs inside named buckets.

use async_trait::async_trait;

use crate::domain::BlobLocation;

use super::define_port_error;

/// Content type stored with HTML artifacts.
pub const HTML_CONTENT_TYPE: &str = "text/html";

define_port_error! {
    /// Errors raised by blob store adapters.
    pub enum BlobStoreError {
        /// The store could not be reached.
        Connection { message: String } =>
            "blob store connection failed: {message}",
        /// A read or write failed during execution.
        Query { message: String } =>
            "blob store request failed: {message}",
        /// A copy source does not exist.
        MissingObject { location: String } =>
            "object {location} does not exist",
        /// The addressed bucket does not exist.
        MissingBucket { bucket: String } =>
            "bucket {bucket} does not exist",
    }
}

/// Port for blob storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read a blob. `None` when the object (or its bucket) is absent.
    async fn get(&self, location: &BlobLocation) -> Result<Option<Vec<u8>>, BlobStoreError>;

    /// Write a blob, replacing any previous object.
    async fn put(
        &self,
        location: &BlobLocation,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BlobStoreError>;

    /// Copy an object within the store.
    async fn copy(&self, from: &BlobLocation, to: &BlobLocation) -> Result<(), BlobStoreError>;

    /// Names of every bucket visible to the store credentials.
    async fn list_buckets(&self) -> Result<Vec<String>, BlobStoreError>;
}
