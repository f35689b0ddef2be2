//! Driving port for establishing templates and editing content.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::{DocumentName, Error, RenderHandle, SectionEdit, TenantId};

/// Field-level edits for one tenant document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateContentRequest {
    /// Tenant owning the document.
    pub tenant_id: TenantId,
    /// Document to re-render after the edits.
    pub document: DocumentName,
    /// Edits keyed by binding key.
    pub edits: BTreeMap<String, SectionEdit>,
}

/// Result of a committed update.
#[derive(Debug)]
pub struct UpdateOutcome {
    /// Keys whose edits were persisted.
    pub applied: Vec<String>,
    /// Keys skipped because the document has no such section.
    pub skipped: Vec<String>,
    /// Re-render of the tenant's rendered copy, running in the background.
    pub render: RenderHandle,
}

/// Write-side use cases consumed by inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentCommand: Send + Sync {
    /// Extract, reconcile and materialize the base template for a tenant and
    /// return the freshly rendered document.
    async fn establish(&self, tenant_id: TenantId, document: DocumentName)
    -> Result<String, Error>;

    /// Persist field-level edits and start the re-render.
    ///
    /// # Errors
    ///
    /// `invalid_request` when no edited key exists for the document or an
    /// edit has the wrong content shape; `upstream_failure` when a store
    /// call fails.
    async fn update(&self, request: UpdateContentRequest) -> Result<UpdateOutcome, Error>;
}
