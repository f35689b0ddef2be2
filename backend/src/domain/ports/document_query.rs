//! Driving port for reading tenant documents.

use async_trait::async_trait;

use crate::domain::{DocumentName, Error, SectionMapping, TenantId};

/// Read-side use cases consumed by inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentQuery: Send + Sync {
    /// Resolve the tenant's rendered document, rendering and caching it from
    /// the working template on first read.
    ///
    /// # Errors
    ///
    /// `not_found` when neither a rendered copy nor a working template exists.
    async fn resolve(&self, tenant_id: TenantId, document: DocumentName) -> Result<String, Error>;

    /// Selector mapping of the tenant's visible sections for the document.
    async fn section_mapping(
        &self,
        tenant_id: TenantId,
        document: DocumentName,
    ) -> Result<SectionMapping, Error>;
}
