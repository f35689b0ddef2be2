//! Port producing the selector mapping used by establish.
//!
//! Deployments either compute the mapping in-process
//! ([`crate::domain::LocalSectionMapper`]) or call a separate mapping service
//! over HTTP.

use async_trait::async_trait;

use crate::domain::{DocumentName, SectionMapping, TenantId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by section mapper adapters.
    pub enum SectionMapperError {
        /// The tenant has no record to map.
        NotFound { message: String } =>
            "no sections to map: {message}",
        /// The mapping source could not be reached.
        Transport { message: String } =>
            "section mapper transport failed: {message}",
        /// The mapping source failed while answering.
        Upstream { message: String } =>
            "section mapper failed: {message}",
        /// The mapping source answered with an unreadable payload.
        Decode { message: String } =>
            "section mapping could not be decoded: {message}",
    }
}

/// Port for selector mapping lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SectionMapper: Send + Sync {
    /// Selector mapping of the visible sections of `document`.
    async fn map_sections(
        &self,
        tenant_id: TenantId,
        document: DocumentName,
    ) -> Result<SectionMapping, SectionMapperError>;
}
