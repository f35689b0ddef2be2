//! Shared fixture for the pipeline integration tests.
//!
//! Integration tests compile as separate crates, so the in-memory wiring of
//! stores and services lives here once.

use std::sync::Arc;

use pagebind::domain::{
    ArtifactKind, ContentService, DocumentName, LocalSectionMapper, PublishService, TenantId,
};
use pagebind::outbound::{InMemoryBlobStore, InMemoryRecordStore};

pub const TENANT: TenantId = TenantId::new(1);

/// Base template with one text binding and one two-image gallery.
pub const BASE_INDEX: &str = concat!(
    r#"<html><body><div x-binding-key="hero" x-binding-type="title">Welcome</div>"#,
    r#"<section x-binding-key="gallery" x-binding-type="container">"#,
    r#"<img src="a.png"><img src="b.png"></section></body></html>"#,
);

pub type Content =
    ContentService<InMemoryRecordStore, InMemoryBlobStore, LocalSectionMapper<InMemoryRecordStore>>;

/// Stores plus the services driving them.
pub struct Pipeline {
    pub records: Arc<InMemoryRecordStore>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub content: Arc<Content>,
    pub publisher: Arc<PublishService<InMemoryRecordStore, InMemoryBlobStore>>,
}

impl Pipeline {
    /// Pipeline whose shared bucket holds `base` as the index template.
    pub fn with_index(base: &str) -> Self {
        let blobs = InMemoryBlobStore::new()
            .with_object(&ArtifactKind::BaseTemplate.locate(TENANT, DocumentName::Index), base);
        Self::from_stores(InMemoryRecordStore::new(), blobs)
    }

    pub fn from_stores(records: InMemoryRecordStore, blobs: InMemoryBlobStore) -> Self {
        let records = Arc::new(records);
        let blobs = Arc::new(blobs);
        let mapper = Arc::new(LocalSectionMapper::new(Arc::clone(&records)));
        let content = Arc::new(ContentService::new(
            Arc::clone(&records),
            Arc::clone(&blobs),
            mapper,
        ));
        let publisher = Arc::new(PublishService::new(Arc::clone(&records), Arc::clone(&blobs)));
        Self {
            records,
            blobs,
            content,
            publisher,
        }
    }

    /// Stored artifact as text, if present.
    pub fn artifact(&self, kind: ArtifactKind, document: DocumentName) -> Option<String> {
        self.blobs
            .object(&kind.locate(TENANT, document))
            .map(|bytes| String::from_utf8(bytes).expect("artifacts are utf-8"))
    }
}
