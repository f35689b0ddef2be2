//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`TenantRecordStore`, `BlobStore`, `SectionMapper`,
//! `CopyRewriter`) are implemented by outbound adapters; driving ports
//! (`DocumentQuery`, `DocumentCommand`, `PublishCommand`, `PreviewQuery`,
//! `RewriteCommand`) are implemented by domain services and consumed by the
//! HTTP adapter.

mod macros;
pub(crate) use macros::define_port_error;

mod blob_store;
mod copy_rewriter;
mod document_command;
mod document_query;
mod preview_query;
mod publish_command;
mod rewrite_command;
mod section_mapper;
mod tenant_record_store;

#[cfg(test)]
pub use blob_store::MockBlobStore;
pub use blob_store::{BlobStore, BlobStoreError, HTML_CONTENT_TYPE};
#[cfg(test)]
pub use copy_rewriter::MockCopyRewriter;
pub use copy_rewriter::{
    CopyRewriter, CopyRewriterError, PromptMessage, PromptRole, UnconfiguredCopyRewriter,
};
#[cfg(test)]
pub use document_command::MockDocumentCommand;
pub use document_command::{DocumentCommand, UpdateContentRequest, UpdateOutcome};
#[cfg(test)]
pub use document_query::MockDocumentQuery;
pub use document_query::DocumentQuery;
#[cfg(test)]
pub use preview_query::MockPreviewQuery;
pub use preview_query::{LIST_BUCKETS_FILE, PreviewContent, PreviewQuery};
#[cfg(test)]
pub use publish_command::MockPublishCommand;
pub use publish_command::PublishCommand;
#[cfg(test)]
pub use rewrite_command::MockRewriteCommand;
pub use rewrite_command::{RewriteCommand, RewriteRequest};
#[cfg(test)]
pub use section_mapper::MockSectionMapper;
pub use section_mapper::{SectionMapper, SectionMapperError};
#[cfg(test)]
pub use tenant_record_store::MockTenantRecordStore;
pub use tenant_record_store::{SectionPath, TenantRecordStore, TenantRecordStoreError};
