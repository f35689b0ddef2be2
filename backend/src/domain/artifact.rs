//! Blob locations of template artifacts.
//!
//! Every artifact is stored under the document's file name; the bucket
//! identifies the artifact's role and, except for base templates, the tenant.

use std::fmt;

use crate::domain::{DocumentName, TenantId};

/// Bucket holding the shared, tenant-independent base templates.
pub const BASE_TEMPLATE_BUCKET: &str = "template";

/// Address of one blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobLocation {
    bucket: String,
    key: String,
}

impl BlobLocation {
    /// Address `key` inside `bucket`.
    #[must_use]
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Bucket holding the object.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key inside the bucket.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for BlobLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Role an artifact plays in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Authored template shared by all tenants.
    BaseTemplate,
    /// Base template with bound regions replaced by placeholders.
    WorkingTemplate,
    /// Working template with persisted content substituted (staging).
    RenderedCopy,
    /// Promoted rendered copy served to production.
    Production,
}

impl ArtifactKind {
    /// Blob location of this artifact for the tenant and document.
    ///
    /// # Examples
    /// ```
    /// use pagebind::domain::{ArtifactKind, DocumentName, TenantId};
    ///
    /// let location = ArtifactKind::RenderedCopy.locate(TenantId::new(1), DocumentName::Index);
    /// assert_eq!(location.to_string(), "test-environment-bucket-1/index.html");
    /// ```
    #[must_use]
    pub fn locate(self, tenant_id: TenantId, document: DocumentName) -> BlobLocation {
        let bucket = match self {
            Self::BaseTemplate => BASE_TEMPLATE_BUCKET.to_owned(),
            Self::WorkingTemplate => format!("template-for-client-{tenant_id}"),
            Self::RenderedCopy => format!("test-environment-bucket-{tenant_id}"),
            Self::Production => format!("production-environment-bucket-{tenant_id}"),
        };
        BlobLocation::new(bucket, document.file_name())
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BaseTemplate => "base template",
            Self::WorkingTemplate => "working template",
            Self::RenderedCopy => "rendered copy",
            Self::Production => "production copy",
        };
        f.write_str(label)
    }
}
