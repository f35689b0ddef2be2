//! Promotion of a tenant's staging state to production.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{BlobStore, PublishCommand, TenantRecordStore};
use crate::domain::resolver::{map_blob_error, map_record_error};
use crate::domain::{
    ArtifactKind, DocumentName, DocumentResolver, EnvironmentName, Error, TenantId,
};

/// Copies `dev` over `prod` and the rendered copy into the production
/// bucket. Neither step is rolled back when the other fails; callers retry
/// the whole promotion.
pub struct PublishService<R: ?Sized, B: ?Sized> {
    records: Arc<R>,
    blobs: Arc<B>,
    resolver: DocumentResolver<R, B>,
}

impl<R, B> PublishService<R, B>
where
    R: TenantRecordStore + ?Sized,
    B: BlobStore + ?Sized,
{
    /// Publisher over the record and blob stores.
    #[must_use]
    pub fn new(records: Arc<R>, blobs: Arc<B>) -> Self {
        let resolver = DocumentResolver::new(Arc::clone(&records), Arc::clone(&blobs));
        Self {
            records,
            blobs,
            resolver,
        }
    }
}

#[async_trait]
impl<R, B> PublishCommand for PublishService<R, B>
where
    R: TenantRecordStore + ?Sized,
    B: BlobStore + ?Sized,
{
    async fn publish(&self, tenant_id: TenantId, document: DocumentName) -> Result<(), Error> {
        let record = self
            .records
            .fetch(tenant_id)
            .await
            .map_err(|error| map_record_error(error, tenant_id))?
            .ok_or_else(|| Error::not_found(format!("tenant {tenant_id} has no record")))?;

        self.records
            .replace_environment(tenant_id, EnvironmentName::Prod, &record.environments.dev)
            .await
            .map_err(|error| map_record_error(error, tenant_id))?;

        // Renders and caches the staging copy when only the template exists.
        self.resolver.resolve(tenant_id, document).await?;

        let from = ArtifactKind::RenderedCopy.locate(tenant_id, document);
        let to = ArtifactKind::Production.locate(tenant_id, document);
        self.blobs
            .copy(&from, &to)
            .await
            .map_err(|error| map_blob_error(error, &to))?;
        info!(tenant = %tenant_id, %document, "published");
        Ok(())
    }
}
