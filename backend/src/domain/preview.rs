//! Raw blob previews for operators.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{BlobStore, LIST_BUCKETS_FILE, PreviewContent, PreviewQuery};
use crate::domain::resolver::map_blob_error;
use crate::domain::{BlobLocation, Error};

/// [`PreviewQuery`] reading straight from the blob store.
pub struct BlobPreviewService<B: ?Sized> {
    blobs: Arc<B>,
}

impl<B: ?Sized> BlobPreviewService<B> {
    /// Service reading from `blobs`.
    #[must_use]
    pub fn new(blobs: Arc<B>) -> Self {
        Self { blobs }
    }
}

#[async_trait]
impl<B> PreviewQuery for BlobPreviewService<B>
where
    B: BlobStore + ?Sized,
{
    async fn preview(&self, bucket: &str, file: &str) -> Result<PreviewContent, Error> {
        if bucket.trim().is_empty() || file.trim().is_empty() {
            return Err(Error::invalid_request("bucket and file are required"));
        }
        let location = BlobLocation::new(bucket, file);
        if file == LIST_BUCKETS_FILE {
            return self
                .blobs
                .list_buckets()
                .await
                .map(PreviewContent::Buckets)
                .map_err(|error| map_blob_error(error, &location));
        }
        self.blobs
            .get(&location)
            .await
            .map_err(|error| map_blob_error(error, &location))?
            .map(PreviewContent::Object)
            .ok_or_else(|| Error::not_found(format!("{location} does not exist")))
    }
}
