//! Establish and update orchestration.
//!
//! [`ContentService`] drives the binding pipeline for one tenant document:
//! establishing a working template from the shared base template, serving
//! the rendered copy through the [`DocumentResolver`], and committing
//! field-level edits followed by a background re-render.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::binding::{extract, reconcile};
use crate::domain::markup::decode_document;
use crate::domain::ports::{
    BlobStore, DocumentCommand, DocumentQuery, HTML_CONTENT_TYPE, SectionMapper,
    SectionMapperError, SectionPath, TenantRecordStore, TenantRecordStoreError,
    UpdateContentRequest, UpdateOutcome,
};
use crate::domain::resolver::{map_blob_error, map_markup_error, map_record_error};
use crate::domain::template::materialize;
use crate::domain::{
    ArtifactKind, DocumentName, DocumentResolver, Error, RenderHandle, SectionMap, SectionMapping,
    TenantId, TenantRecord, map_sections,
};

fn map_mapper_error(error: SectionMapperError, tenant_id: TenantId) -> Error {
    warn!(%error, tenant = %tenant_id, operation = "map_sections", "section mapping failed");
    match error {
        SectionMapperError::NotFound { .. } => {
            Error::not_found(format!("tenant {tenant_id} has no record"))
        }
        other => Error::upstream(format!("section mapping failed: {other}")),
    }
}

/// Content pipeline service implementing [`DocumentQuery`] and
/// [`DocumentCommand`].
pub struct ContentService<R: ?Sized, B: ?Sized, M: ?Sized> {
    records: Arc<R>,
    blobs: Arc<B>,
    mapper: Arc<M>,
    resolver: DocumentResolver<R, B>,
}

impl<R, B, M> ContentService<R, B, M>
where
    R: TenantRecordStore + ?Sized,
    B: BlobStore + ?Sized,
    M: ?Sized,
{
    /// Service over the record store, blob store and mapping source.
    #[must_use]
    pub fn new(records: Arc<R>, blobs: Arc<B>, mapper: Arc<M>) -> Self {
        let resolver = DocumentResolver::new(Arc::clone(&records), Arc::clone(&blobs));
        Self {
            records,
            blobs,
            mapper,
            resolver,
        }
    }

    async fn load_record(&self, tenant_id: TenantId) -> Result<TenantRecord, Error> {
        self.records
            .fetch(tenant_id)
            .await
            .map_err(|error| map_record_error(error, tenant_id))?
            .ok_or_else(|| Error::not_found(format!("tenant {tenant_id} has no record")))
    }

    /// Fetch the tenant record, provisioning an empty one on first use.
    async fn load_or_provision(&self, tenant_id: TenantId) -> Result<TenantRecord, Error> {
        if let Some(record) = self
            .records
            .fetch(tenant_id)
            .await
            .map_err(|error| map_record_error(error, tenant_id))?
        {
            return Ok(record);
        }

        let record = TenantRecord::provisioned(tenant_id, Utc::now().timestamp_millis());
        let created = self
            .records
            .create(&record)
            .await
            .map_err(|error| map_record_error(error, tenant_id))?;
        if created {
            info!(tenant = %tenant_id, "tenant record provisioned");
            return Ok(record);
        }
        // Lost a creation race; the winner's record is authoritative.
        self.load_record(tenant_id).await
    }

    /// Persist reconciliation additions then removals. Failures are logged per
    /// key and do not stop the sweep.
    async fn sweep(
        &self,
        tenant_id: TenantId,
        document: DocumentName,
        record: &TenantRecord,
        extracted: &SectionMap,
    ) {
        let channel = document.channel();
        let existing: BTreeSet<String> = record.dev_sections(channel).keys().cloned().collect();
        let plan = reconcile(&existing, extracted);
        if plan.is_empty() {
            return;
        }
        info!(
            tenant = %tenant_id,
            %document,
            added = plan.to_add.len(),
            removed = plan.to_remove.len(),
            "reconciling bindings"
        );

        for key in &plan.to_add {
            let Some(section) = extracted.get(key) else {
                continue;
            };
            let path = SectionPath::dev(tenant_id, channel, key.as_str());
            if let Err(error) = self.records.put_section(&path, section).await {
                warn!(%error, operation = "add_section", tenant = %tenant_id, key = %key, "section not persisted");
            }
        }
        for key in &plan.to_remove {
            let path = SectionPath::dev(tenant_id, channel, key.as_str());
            if let Err(error) = self.records.remove_section(&path).await {
                warn!(%error, operation = "remove_section", tenant = %tenant_id, key = %key, "section not removed");
            }
        }
    }
}

impl<R, B, M> ContentService<R, B, M>
where
    R: TenantRecordStore + ?Sized + 'static,
    B: BlobStore + ?Sized + 'static,
    M: SectionMapper + ?Sized,
{
    async fn establish_document(
        &self,
        tenant_id: TenantId,
        document: DocumentName,
    ) -> Result<String, Error> {
        let base = ArtifactKind::BaseTemplate.locate(tenant_id, document);
        let bytes = self
            .blobs
            .get(&base)
            .await
            .map_err(|error| map_blob_error(error, &base))?
            .ok_or_else(|| Error::not_found(format!("base template {base} does not exist")))?;
        let source = decode_document(bytes).map_err(|error| map_markup_error(error, &base))?;
        let extracted = extract(&source).map_err(|error| map_markup_error(error, &base))?;

        let record = self.load_or_provision(tenant_id).await?;
        self.sweep(tenant_id, document, &record, &extracted).await;

        let mapping = self
            .mapper
            .map_sections(tenant_id, document)
            .await
            .map_err(|error| map_mapper_error(error, tenant_id))?;
        let template = materialize(&source, &mapping).map_err(|error| map_markup_error(error, &base))?;

        let working = ArtifactKind::WorkingTemplate.locate(tenant_id, document);
        self.blobs
            .put(&working, template.as_bytes().to_vec(), HTML_CONTENT_TYPE)
            .await
            .map_err(|error| map_blob_error(error, &working))?;

        let rendered = self.resolver.render(tenant_id, document, &template).await?;
        self.resolver
            .store_rendered(tenant_id, document, &rendered)
            .await?;
        info!(tenant = %tenant_id, %document, bindings = extracted.len(), "template established");
        Ok(rendered)
    }

    async fn apply_edits(&self, request: UpdateContentRequest) -> Result<UpdateOutcome, Error> {
        let UpdateContentRequest {
            tenant_id,
            document,
            edits,
        } = request;
        if edits.is_empty() {
            return Err(Error::invalid_request("contentSections must not be empty"));
        }

        let record = self.load_record(tenant_id).await?;
        let channel = document.channel();
        let sections = record.dev_sections(channel);

        let (known, unknown): (Vec<_>, Vec<_>) =
            edits.iter().partition(|(key, _)| sections.contains_key(key.as_str()));
        if known.is_empty() {
            return Err(Error::invalid_request(format!(
                "no edited key exists in {document} for tenant {tenant_id}"
            ))
            .with_details(json!({ "unknownKeys": unknown.iter().map(|(key, _)| key).collect::<Vec<_>>() })));
        }

        for (key, edit) in &known {
            if edit.is_empty() {
                return Err(Error::invalid_request(format!("edit for {key} changes nothing")));
            }
            if let Some(section) = sections.get(key.as_str()) {
                edit.validate_for(section)
                    .map_err(|error| Error::invalid_request(error.to_string()))?;
            }
        }

        let mut skipped: Vec<String> = unknown.into_iter().map(|(key, _)| key.clone()).collect();
        for key in &skipped {
            warn!(tenant = %tenant_id, %document, key = %key, "skipping edit for unknown section");
        }

        let mut applied = Vec::new();
        let mut failed = Vec::new();
        for (key, edit) in known {
            let path = SectionPath::dev(tenant_id, channel, key.as_str());
            match self.records.edit_section(&path, edit).await {
                Ok(()) => applied.push(key.clone()),
                Err(TenantRecordStoreError::MissingSection { .. }) => {
                    warn!(tenant = %tenant_id, key = %key, "section removed before edit");
                    skipped.push(key.clone());
                }
                Err(error) => {
                    warn!(%error, operation = "edit_section", tenant = %tenant_id, key = %key, "section edit failed");
                    failed.push(key.clone());
                }
            }
        }

        let render = if applied.is_empty() {
            RenderHandle::completed()
        } else {
            let resolver = self.resolver.clone();
            RenderHandle::spawn(async move {
                resolver.rerender(tenant_id, document).await.map(|_| ())
            })
        };

        if !failed.is_empty() {
            return Err(Error::upstream(format!(
                "{} of {} section edits failed",
                failed.len(),
                failed.len() + applied.len()
            ))
            .with_details(json!({ "failedKeys": failed })));
        }
        Ok(UpdateOutcome {
            applied,
            skipped,
            render,
        })
    }
}

#[async_trait]
impl<R, B, M> DocumentQuery for ContentService<R, B, M>
where
    R: TenantRecordStore + ?Sized + 'static,
    B: BlobStore + ?Sized + 'static,
    M: SectionMapper + ?Sized,
{
    async fn resolve(&self, tenant_id: TenantId, document: DocumentName) -> Result<String, Error> {
        self.resolver.resolve(tenant_id, document).await
    }

    async fn section_mapping(
        &self,
        tenant_id: TenantId,
        document: DocumentName,
    ) -> Result<SectionMapping, Error> {
        let record = self.load_record(tenant_id).await?;
        Ok(map_sections(record.dev_sections(document.channel())))
    }
}

#[async_trait]
impl<R, B, M> DocumentCommand for ContentService<R, B, M>
where
    R: TenantRecordStore + ?Sized + 'static,
    B: BlobStore + ?Sized + 'static,
    M: SectionMapper + ?Sized,
{
    async fn establish(&self, tenant_id: TenantId, document: DocumentName) -> Result<String, Error> {
        self.establish_document(tenant_id, document).await
    }

    async fn update(&self, request: UpdateContentRequest) -> Result<UpdateOutcome, Error> {
        self.apply_edits(request).await
    }
}

#[cfg(test)]
mod tests;
