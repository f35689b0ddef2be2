//! Port for the per-tenant structured record store.
//!
//! Sections are addressed by a three-part path (environment, channel, key)
//! below the tenant record. Every section mutation is one atomic field-level
//! call; adapters never rewrite a whole record to change one key.

use async_trait::async_trait;

use crate::domain::{
    Channel, EnvironmentName, EnvironmentRecord, Section, SectionEdit, TenantId, TenantRecord,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by tenant record store adapters.
    pub enum TenantRecordStoreError {
        /// The store could not be reached.
        Connection { message: String } =>
            "tenant record store connection failed: {message}",
        /// A read or mutation failed during execution.
        Query { message: String } =>
            "tenant record store query failed: {message}",
        /// A stored item could not be decoded into a record.
        Decode { message: String } =>
            "tenant record could not be decoded: {message}",
        /// The addressed tenant record does not exist.
        MissingTenant { tenant_id: u64 } =>
            "tenant record {tenant_id} does not exist",
        /// A conditional edit addressed a section that does not exist.
        MissingSection { key: String } =>
            "section {key} does not exist",
    }
}

/// Address of one section inside a tenant record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPath {
    /// Tenant owning the record.
    pub tenant_id: TenantId,
    /// Environment slot.
    pub environment: EnvironmentName,
    /// Channel whose section map holds the section.
    pub channel: Channel,
    /// Binding key of the section.
    pub key: String,
}

impl SectionPath {
    /// Path of a section in the `dev` environment.
    #[must_use]
    pub fn dev(tenant_id: TenantId, channel: Channel, key: impl Into<String>) -> Self {
        Self {
            tenant_id,
            environment: EnvironmentName::Dev,
            channel,
            key: key.into(),
        }
    }
}

impl std::fmt::Display for SectionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/environments.{}.{}.{}",
            self.tenant_id, self.environment, self.channel, self.key
        )
    }
}

/// Port for tenant record persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantRecordStore: Send + Sync {
    /// Fetch a tenant record with a consistent read. `None` when absent.
    async fn fetch(
        &self,
        tenant_id: TenantId,
    ) -> Result<Option<TenantRecord>, TenantRecordStoreError>;

    /// Create a record unless one exists. Returns `false` when the tenant was
    /// already provisioned.
    async fn create(&self, record: &TenantRecord) -> Result<bool, TenantRecordStoreError>;

    /// Write a full section at `path`, replacing any previous value.
    async fn put_section(
        &self,
        path: &SectionPath,
        section: &Section,
    ) -> Result<(), TenantRecordStoreError>;

    /// Remove the section at `path`. Removing an absent key succeeds.
    async fn remove_section(&self, path: &SectionPath) -> Result<(), TenantRecordStoreError>;

    /// Apply a field-level edit to an existing section.
    ///
    /// Fails with [`TenantRecordStoreError::MissingSection`] when no section
    /// exists at `path`.
    async fn edit_section(
        &self,
        path: &SectionPath,
        edit: &SectionEdit,
    ) -> Result<(), TenantRecordStoreError>;

    /// Overwrite a whole environment slot.
    async fn replace_environment(
        &self,
        tenant_id: TenantId,
        target: EnvironmentName,
        environment: &EnvironmentRecord,
    ) -> Result<(), TenantRecordStoreError>;
}
