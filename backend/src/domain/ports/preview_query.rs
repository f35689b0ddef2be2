//! Driving port for raw blob previews.

use async_trait::async_trait;

use crate::domain::Error;

/// File name requesting the bucket listing instead of an object.
pub const LIST_BUCKETS_FILE: &str = "list";

/// What a preview request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewContent {
    /// Names of every bucket.
    Buckets(Vec<String>),
    /// Raw object bytes.
    Object(Vec<u8>),
}

/// Driving port for raw blob previews.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreviewQuery: Send + Sync {
    /// Fetch `file` from `bucket`, or list buckets when `file` is
    /// [`LIST_BUCKETS_FILE`].
    async fn preview(&self, bucket: &str, file: &str) -> Result<PreviewContent, Error>;
}
