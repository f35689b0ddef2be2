//! Driving port for promoting a tenant's staging state to production.

use async_trait::async_trait;

use crate::domain::{DocumentName, Error, TenantId};

/// Promotion use case. Idempotent; a failed promotion may be retried whole.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PublishCommand: Send + Sync {
    /// Copy staging sections and the rendered document to production.
    async fn publish(&self, tenant_id: TenantId, document: DocumentName) -> Result<(), Error>;
}
