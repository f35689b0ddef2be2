//! Serve-time resolution of a tenant's rendered document.
//!
//! Resolution walks an ordered list of lookup steps and stops at the first
//! hit: the cached rendered copy, then the working template (rendered with
//! persisted content and cached). There is no fallback to the shared base
//! template; a tenant without a working template is `not_found`.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::markup::{MarkupError, decode_document};
use crate::domain::ports::{
    BlobStore, BlobStoreError, HTML_CONTENT_TYPE, TenantRecordStore, TenantRecordStoreError,
};
use crate::domain::template::substitute;
use crate::domain::{ArtifactKind, BlobLocation, DocumentName, Error, TenantId};

/// Outcome of one lookup step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Document text.
    Found(String),
    /// Nothing stored at this step.
    NotFound,
}

/// Lookup steps in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStep {
    /// Tenant's rendered copy.
    RenderedCopy,
    /// Tenant's working template.
    WorkingTemplate,
}

/// Order in which [`DocumentResolver::resolve`] tries its steps.
pub const RESOLUTION_ORDER: [ResolveStep; 2] =
    [ResolveStep::RenderedCopy, ResolveStep::WorkingTemplate];

pub(crate) fn map_blob_error(error: BlobStoreError, location: &BlobLocation) -> Error {
    warn!(%error, %location, "blob store call failed");
    match error {
        BlobStoreError::MissingObject { .. } | BlobStoreError::MissingBucket { .. } => {
            Error::not_found(format!("{location} does not exist"))
        }
        BlobStoreError::Connection { .. } | BlobStoreError::Query { .. } => {
            Error::upstream(format!("blob store request for {location} failed"))
        }
    }
}

pub(crate) fn map_record_error(error: TenantRecordStoreError, tenant_id: TenantId) -> Error {
    warn!(%error, tenant = %tenant_id, "tenant record store call failed");
    match error {
        TenantRecordStoreError::MissingTenant { .. } => {
            Error::not_found(format!("tenant {tenant_id} has no record"))
        }
        other => Error::upstream(format!("tenant record store failed: {other}")),
    }
}

pub(crate) fn map_markup_error(error: MarkupError, location: &BlobLocation) -> Error {
    warn!(%error, %location, "document could not be read");
    Error::parse_failure(format!("{location}: {error}"))
}

/// Renders and caches tenant documents.
pub struct DocumentResolver<R: ?Sized, B: ?Sized> {
    records: Arc<R>,
    blobs: Arc<B>,
}

impl<R: ?Sized, B: ?Sized> Clone for DocumentResolver<R, B> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            blobs: Arc::clone(&self.blobs),
        }
    }
}

impl<R, B> DocumentResolver<R, B>
where
    R: TenantRecordStore + ?Sized,
    B: BlobStore + ?Sized,
{
    /// Resolver over the record and blob stores.
    #[must_use]
    pub fn new(records: Arc<R>, blobs: Arc<B>) -> Self {
        Self { records, blobs }
    }

    /// Resolve the tenant's rendered document.
    pub async fn resolve(&self, tenant_id: TenantId, document: DocumentName) -> Result<String, Error> {
        for step in RESOLUTION_ORDER {
            match self.attempt(step, tenant_id, document).await? {
                Lookup::Found(html) => {
                    debug!(tenant = %tenant_id, %document, ?step, "document resolved");
                    return Ok(html);
                }
                Lookup::NotFound => debug!(tenant = %tenant_id, %document, ?step, "lookup missed"),
            }
        }
        Err(Error::not_found(format!(
            "no rendered copy or working template for tenant {tenant_id} and {document}"
        )))
    }

    async fn attempt(
        &self,
        step: ResolveStep,
        tenant_id: TenantId,
        document: DocumentName,
    ) -> Result<Lookup, Error> {
        match step {
            ResolveStep::RenderedCopy => {
                let location = ArtifactKind::RenderedCopy.locate(tenant_id, document);
                Ok(match self.load(&location).await? {
                    Some(html) => Lookup::Found(html),
                    None => Lookup::NotFound,
                })
            }
            ResolveStep::WorkingTemplate => {
                let location = ArtifactKind::WorkingTemplate.locate(tenant_id, document);
                let Some(template) = self.load(&location).await? else {
                    return Ok(Lookup::NotFound);
                };
                let rendered = self.render(tenant_id, document, &template).await?;
                if let Err(error) = self.store_rendered(tenant_id, document, &rendered).await {
                    warn!(error = %error, tenant = %tenant_id, %document, "caching rendered copy failed");
                }
                Ok(Lookup::Found(rendered))
            }
        }
    }

    /// Substitute the tenant's persisted `dev` content into `template`.
    pub async fn render(
        &self,
        tenant_id: TenantId,
        document: DocumentName,
        template: &str,
    ) -> Result<String, Error> {
        let record = self
            .records
            .fetch(tenant_id)
            .await
            .map_err(|error| map_record_error(error, tenant_id))?
            .ok_or_else(|| Error::not_found(format!("tenant {tenant_id} has no record")))?;
        let location = ArtifactKind::WorkingTemplate.locate(tenant_id, document);
        substitute(template, record.dev_sections(document.channel()))
            .map_err(|error| map_markup_error(error, &location))
    }

    /// Re-render the rendered copy from the current working template.
    pub async fn rerender(&self, tenant_id: TenantId, document: DocumentName) -> Result<String, Error> {
        let location = ArtifactKind::WorkingTemplate.locate(tenant_id, document);
        let template = self
            .load(&location)
            .await?
            .ok_or_else(|| Error::not_found(format!("{location} does not exist")))?;
        let rendered = self.render(tenant_id, document, &template).await?;
        self.store_rendered(tenant_id, document, &rendered).await?;
        Ok(rendered)
    }

    /// Overwrite the tenant's rendered copy.
    pub async fn store_rendered(
        &self,
        tenant_id: TenantId,
        document: DocumentName,
        rendered: &str,
    ) -> Result<(), Error> {
        let location = ArtifactKind::RenderedCopy.locate(tenant_id, document);
        self.blobs
            .put(&location, rendered.as_bytes().to_vec(), HTML_CONTENT_TYPE)
            .await
            .map_err(|error| map_blob_error(error, &location))
    }

    /// Read and decode a document. A missing bucket reads as a missing
    /// object so an unprovisioned tenant falls through the chain.
    async fn load(&self, location: &BlobLocation) -> Result<Option<String>, Error> {
        let bytes = match self.blobs.get(location).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) | Err(BlobStoreError::MissingBucket { .. }) => return Ok(None),
            Err(error) => return Err(map_blob_error(error, location)),
        };
        decode_document(bytes)
            .map(Some)
            .map_err(|error| map_markup_error(error, location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockBlobStore, MockTenantRecordStore};
    use crate::domain::{ErrorCode, Section, SectionContent, SectionKind, TenantRecord};
    use mockall::predicate::eq;
    use rstest::rstest;

    const TENANT: TenantId = TenantId::new(1);

    fn record_with_hero(content: &str) -> TenantRecord {
        let mut record = TenantRecord::provisioned(TENANT, 0);
        record.environments.dev.website.insert(
            "hero".into(),
            Section::try_new("hero", SectionKind::Title, SectionContent::Text(content.into()))
                .expect("valid"),
        );
        record
    }

    fn rendered_location() -> BlobLocation {
        ArtifactKind::RenderedCopy.locate(TENANT, DocumentName::Index)
    }

    fn working_location() -> BlobLocation {
        ArtifactKind::WorkingTemplate.locate(TENANT, DocumentName::Index)
    }

    #[rstest]
    #[tokio::test]
    async fn cached_rendered_copy_wins() {
        let mut blobs = MockBlobStore::new();
        blobs
            .expect_get()
            .with(eq(rendered_location()))
            .times(1)
            .return_once(|_| Ok(Some(b"<p>cached</p>".to_vec())));
        let records = MockTenantRecordStore::new();
        let resolver = DocumentResolver::new(Arc::new(records), Arc::new(blobs));

        let html = resolver.resolve(TENANT, DocumentName::Index).await.expect("resolves");

        assert_eq!(html, "<p>cached</p>");
    }

    #[rstest]
    #[tokio::test]
    async fn working_template_is_rendered_and_cached() {
        let mut blobs = MockBlobStore::new();
        blobs
            .expect_get()
            .with(eq(rendered_location()))
            .return_once(|_| Ok(None));
        blobs
            .expect_get()
            .with(eq(working_location()))
            .return_once(|_| Ok(Some(b"<h1>{{ hero }}</h1>".to_vec())));
        blobs
            .expect_put()
            .withf(|location, body, content_type| {
                *location == rendered_location()
                    && body.as_slice() == b"<h1>Hello</h1>"
                    && content_type == HTML_CONTENT_TYPE
            })
            .times(1)
            .return_once(|_, _, _| Ok(()));
        let mut records = MockTenantRecordStore::new();
        records
            .expect_fetch()
            .return_once(|_| Ok(Some(record_with_hero("Hello"))));
        let resolver = DocumentResolver::new(Arc::new(records), Arc::new(blobs));

        let html = resolver.resolve(TENANT, DocumentName::Index).await.expect("resolves");

        assert_eq!(html, "<h1>Hello</h1>");
    }

    #[rstest]
    #[tokio::test]
    async fn never_falls_back_to_the_base_template() {
        let mut blobs = MockBlobStore::new();
        blobs.expect_get().times(2).returning(|_| Ok(None));
        let resolver = DocumentResolver::new(Arc::new(MockTenantRecordStore::new()), Arc::new(blobs));

        let error = resolver
            .resolve(TENANT, DocumentName::Index)
            .await
            .expect_err("nothing to serve");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn cache_write_failures_still_return_the_render() {
        let mut blobs = MockBlobStore::new();
        blobs
            .expect_get()
            .with(eq(rendered_location()))
            .return_once(|_| Ok(None));
        blobs
            .expect_get()
            .with(eq(working_location()))
            .return_once(|_| Ok(Some(b"{{ hero }}".to_vec())));
        blobs
            .expect_put()
            .return_once(|_, _, _| Err(BlobStoreError::connection("reset")));
        let mut records = MockTenantRecordStore::new();
        records
            .expect_fetch()
            .return_once(|_| Ok(Some(record_with_hero("Hi"))));
        let resolver = DocumentResolver::new(Arc::new(records), Arc::new(blobs));

        let html = resolver.resolve(TENANT, DocumentName::Index).await.expect("resolves");

        assert_eq!(html, "Hi");
    }

    #[rstest]
    #[tokio::test]
    async fn store_failures_surface_as_upstream_errors() {
        let mut blobs = MockBlobStore::new();
        blobs
            .expect_get()
            .return_once(|_| Err(BlobStoreError::query("throttled")));
        let resolver = DocumentResolver::new(Arc::new(MockTenantRecordStore::new()), Arc::new(blobs));

        let error = resolver
            .resolve(TENANT, DocumentName::Index)
            .await
            .expect_err("store failure");

        assert_eq!(error.code(), ErrorCode::UpstreamFailure);
        assert!(!error.message().contains("throttled"));
    }

    #[rstest]
    #[tokio::test]
    async fn non_utf8_documents_are_parse_failures() {
        let mut blobs = MockBlobStore::new();
        blobs
            .expect_get()
            .return_once(|_| Ok(Some(vec![0xff, 0x00])));
        let resolver = DocumentResolver::new(Arc::new(MockTenantRecordStore::new()), Arc::new(blobs));

        let error = resolver
            .resolve(TENANT, DocumentName::Index)
            .await
            .expect_err("bad bytes");

        assert_eq!(error.code(), ErrorCode::ParseFailure);
    }
}
