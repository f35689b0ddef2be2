//! Selector to type mapping over a tenant's persisted sections.
//!
//! The mapping is what the editor uses to find editable regions and what the
//! materializer uses to place placeholders. Hidden sections never appear.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{
    SectionMapper, SectionMapperError, TenantRecordStore, TenantRecordStoreError,
};
use crate::domain::{DocumentName, SectionKind, SectionMap, TenantId};

/// Type and storage key of one visible section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionBinding {
    /// Semantic kind of the section.
    #[serde(rename = "type")]
    pub kind: SectionKind,
    /// Storage key of the section.
    pub db_map: String,
    /// Visibility flag; always true in served mappings.
    pub show: bool,
}

/// Visible sections keyed by selector (or binding key).
pub type SectionMapping = BTreeMap<String, SectionBinding>;

/// Flatten a section map into its mapping, omitting hidden sections.
///
/// # Examples
/// ```
/// use pagebind::domain::{map_sections, Section, SectionContent, SectionKind, SectionMap};
///
/// let mut sections = SectionMap::new();
/// let hero = Section::try_new("hero", SectionKind::Title, SectionContent::Text("Hi".into()))
///     .expect("valid");
/// sections.insert("hero".into(), hero.clone());
/// sections.insert("old".into(), hero.with_show(false));
/// assert_eq!(map_sections(&sections).len(), 1);
/// ```
#[must_use]
pub fn map_sections(sections: &SectionMap) -> SectionMapping {
    sections
        .iter()
        .filter(|(_, section)| section.show())
        .map(|(key, section)| {
            (
                section.locator().to_owned(),
                SectionBinding {
                    kind: section.kind().clone(),
                    db_map: key.clone(),
                    show: true,
                },
            )
        })
        .collect()
}

/// [`SectionMapper`] computing the mapping from the record store in-process.
pub struct LocalSectionMapper<R: ?Sized> {
    records: Arc<R>,
}

impl<R: ?Sized> LocalSectionMapper<R> {
    /// Mapper reading sections from `records`.
    #[must_use]
    pub fn new(records: Arc<R>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl<R> SectionMapper for LocalSectionMapper<R>
where
    R: TenantRecordStore + ?Sized,
{
    async fn map_sections(
        &self,
        tenant_id: TenantId,
        document: DocumentName,
    ) -> Result<SectionMapping, SectionMapperError> {
        let record = self
            .records
            .fetch(tenant_id)
            .await
            .map_err(|error| match error {
                TenantRecordStoreError::Connection { message } => {
                    SectionMapperError::transport(message)
                }
                other => SectionMapperError::upstream(other.to_string()),
            })?
            .ok_or_else(|| SectionMapperError::not_found(format!("tenant {tenant_id}")))?;
        Ok(map_sections(record.dev_sections(document.channel())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockTenantRecordStore;
    use crate::domain::{Section, SectionContent, TenantRecord};
    use rstest::rstest;

    fn text(key: &str, kind: SectionKind, show: bool) -> Section {
        Section::try_new(key, kind, SectionContent::Text(format!("{key} text")))
            .expect("valid section")
            .with_show(show)
    }

    #[rstest]
    fn hidden_sections_are_omitted() {
        let mut sections = SectionMap::new();
        sections.insert("hero".into(), text("hero", SectionKind::Title, true));
        sections.insert("retired".into(), text("retired", SectionKind::Content, false));

        let mapping = map_sections(&sections);

        assert_eq!(mapping.len(), 1);
        assert_eq!(
            mapping["hero"],
            SectionBinding {
                kind: SectionKind::Title,
                db_map: "hero".into(),
                show: true,
            }
        );
    }

    #[rstest]
    fn legacy_selectors_key_the_mapping() {
        let mut sections = SectionMap::new();
        sections.insert(
            "intro".into(),
            text("intro", SectionKind::Content, true).with_selector(".intro p"),
        );

        let mapping = map_sections(&sections);

        assert_eq!(mapping[".intro p"].db_map, "intro");
    }

    #[rstest]
    fn serialises_with_db_map_field() {
        let binding = SectionBinding {
            kind: SectionKind::Container,
            db_map: "gallery".into(),
            show: true,
        };
        assert_eq!(
            serde_json::to_value(binding).expect("serialise"),
            serde_json::json!({"type": "container", "dbMap": "gallery", "show": true})
        );
    }

    #[tokio::test]
    async fn local_mapper_reads_dev_sections_of_the_document_channel() {
        let mut record = TenantRecord::provisioned(TenantId::new(5), 0);
        record
            .environments
            .dev
            .sms
            .insert("greeting".into(), text("greeting", SectionKind::Content, true));
        record
            .environments
            .prod
            .sms
            .insert("stale".into(), text("stale", SectionKind::Content, true));

        let mut store = MockTenantRecordStore::new();
        store
            .expect_fetch()
            .times(1)
            .return_once(move |_| Ok(Some(record)));
        let mapper = LocalSectionMapper::new(Arc::new(store));

        let mapping = mapper
            .map_sections(TenantId::new(5), DocumentName::Sms)
            .await
            .expect("mapping");

        assert_eq!(mapping.keys().collect::<Vec<_>>(), ["greeting"]);
    }

    #[tokio::test]
    async fn local_mapper_reports_missing_tenants() {
        let mut store = MockTenantRecordStore::new();
        store.expect_fetch().return_once(|_| Ok(None));
        let mapper = LocalSectionMapper::new(Arc::new(store));

        let error = mapper
            .map_sections(TenantId::new(9), DocumentName::Index)
            .await
            .expect_err("missing tenant");

        assert!(matches!(error, SectionMapperError::NotFound { .. }));
    }
}
