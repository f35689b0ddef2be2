//! In-process record and blob stores.
//!
//! Used for local runs without cloud credentials and by integration tests.
//! Each call takes the lock once, so every section mutation is atomic like
//! its DynamoDB counterpart.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::ports::{
    BlobStore, BlobStoreError, SectionPath, TenantRecordStore, TenantRecordStoreError,
};
use crate::domain::{
    BlobLocation, EnvironmentName, EnvironmentRecord, Section, SectionEdit, TenantId,
    TenantRecord,
};

/// [`TenantRecordStore`] holding records in a map.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<BTreeMap<TenantId, TenantRecord>>,
}

impl InMemoryRecordStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, replacing any existing one.
    #[must_use]
    pub fn with_record(self, record: TenantRecord) -> Self {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record.client_id, record);
        self
    }

    /// Snapshot of a stored record.
    #[must_use]
    pub fn snapshot(&self, tenant_id: TenantId) -> Option<TenantRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&tenant_id)
            .cloned()
    }

    fn with_tenant<T>(
        &self,
        tenant_id: TenantId,
        mutate: impl FnOnce(&mut TenantRecord) -> Result<T, TenantRecordStoreError>,
    ) -> Result<T, TenantRecordStoreError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let record = records
            .get_mut(&tenant_id)
            .ok_or_else(|| TenantRecordStoreError::missing_tenant(tenant_id.get()))?;
        mutate(record)
    }
}

#[async_trait]
impl TenantRecordStore for InMemoryRecordStore {
    async fn fetch(
        &self,
        tenant_id: TenantId,
    ) -> Result<Option<TenantRecord>, TenantRecordStoreError> {
        Ok(self.snapshot(tenant_id))
    }

    async fn create(&self, record: &TenantRecord) -> Result<bool, TenantRecordStoreError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records.contains_key(&record.client_id) {
            return Ok(false);
        }
        records.insert(record.client_id, record.clone());
        Ok(true)
    }

    async fn put_section(
        &self,
        path: &SectionPath,
        section: &Section,
    ) -> Result<(), TenantRecordStoreError> {
        self.with_tenant(path.tenant_id, |record| {
            record
                .environments
                .get_mut(path.environment)
                .sections_mut(path.channel)
                .insert(path.key.clone(), section.clone());
            Ok(())
        })
    }

    async fn remove_section(&self, path: &SectionPath) -> Result<(), TenantRecordStoreError> {
        self.with_tenant(path.tenant_id, |record| {
            record
                .environments
                .get_mut(path.environment)
                .sections_mut(path.channel)
                .remove(&path.key);
            Ok(())
        })
    }

    async fn edit_section(
        &self,
        path: &SectionPath,
        edit: &SectionEdit,
    ) -> Result<(), TenantRecordStoreError> {
        self.with_tenant(path.tenant_id, |record| {
            let section = record
                .environments
                .get_mut(path.environment)
                .sections_mut(path.channel)
                .get_mut(&path.key)
                .ok_or_else(|| TenantRecordStoreError::missing_section(path.key.as_str()))?;
            edit.apply_to(section)
                .map_err(|error| TenantRecordStoreError::query(error.to_string()))
        })
    }

    async fn replace_environment(
        &self,
        tenant_id: TenantId,
        target: EnvironmentName,
        environment: &EnvironmentRecord,
    ) -> Result<(), TenantRecordStoreError> {
        self.with_tenant(tenant_id, |record| {
            *record.environments.get_mut(target) = environment.clone();
            Ok(())
        })
    }
}

type Bucket = BTreeMap<String, Vec<u8>>;

/// [`BlobStore`] holding buckets in a map. Writes create missing buckets.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    buckets: RwLock<BTreeMap<String, Bucket>>,
}

impl InMemoryBlobStore {
    /// Empty store without buckets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object.
    #[must_use]
    pub fn with_object(self, location: &BlobLocation, body: impl Into<Vec<u8>>) -> Self {
        self.insert(location, body.into());
        self
    }

    /// Raw bytes of a stored object.
    #[must_use]
    pub fn object(&self, location: &BlobLocation) -> Option<Vec<u8>> {
        self.buckets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(location.bucket())
            .and_then(|bucket| bucket.get(location.key()))
            .cloned()
    }

    fn insert(&self, location: &BlobLocation, body: Vec<u8>) {
        self.buckets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(location.bucket().to_owned())
            .or_default()
            .insert(location.key().to_owned(), body);
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn get(&self, location: &BlobLocation) -> Result<Option<Vec<u8>>, BlobStoreError> {
        let buckets = self.buckets.read().unwrap_or_else(PoisonError::into_inner);
        let bucket = buckets
            .get(location.bucket())
            .ok_or_else(|| BlobStoreError::missing_bucket(location.bucket()))?;
        Ok(bucket.get(location.key()).cloned())
    }

    async fn put(
        &self,
        location: &BlobLocation,
        body: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), BlobStoreError> {
        self.insert(location, body);
        Ok(())
    }

    async fn copy(&self, from: &BlobLocation, to: &BlobLocation) -> Result<(), BlobStoreError> {
        let body = self
            .object(from)
            .ok_or_else(|| BlobStoreError::missing_object(from.to_string()))?;
        self.insert(to, body);
        Ok(())
    }

    async fn list_buckets(&self) -> Result<Vec<String>, BlobStoreError> {
        Ok(self
            .buckets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect())
    }
}
