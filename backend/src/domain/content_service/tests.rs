//! Tests for establish and update orchestration.

use std::collections::BTreeMap;

use super::*;
use crate::domain::ports::{MockBlobStore, MockSectionMapper, MockTenantRecordStore};
use crate::domain::{
    BlobLocation, ErrorCode, Section, SectionBinding, SectionContent, SectionEdit, SectionKind,
};
use mockall::predicate::eq;
use rstest::{fixture, rstest};

const TENANT: TenantId = TenantId::new(1);

type Service = ContentService<MockTenantRecordStore, MockBlobStore, MockSectionMapper>;

fn service(
    records: MockTenantRecordStore,
    blobs: MockBlobStore,
    mapper: MockSectionMapper,
) -> Service {
    ContentService::new(Arc::new(records), Arc::new(blobs), Arc::new(mapper))
}

fn title(key: &str, content: &str) -> Section {
    Section::try_new(key, SectionKind::Title, SectionContent::Text(content.to_owned()))
        .expect("valid section")
}

#[fixture]
fn record() -> TenantRecord {
    let mut record = TenantRecord::provisioned(TENANT, 0);
    record
        .environments
        .dev
        .website
        .insert("hero".into(), title("hero", "Welcome"));
    record
        .environments
        .dev
        .website
        .insert("stale".into(), title("stale", "Old"));
    record
}

fn location(kind: ArtifactKind) -> BlobLocation {
    kind.locate(TENANT, DocumentName::Index)
}

fn content_edit(text: &str) -> SectionEdit {
    SectionEdit {
        content: Some(SectionContent::Text(text.to_owned())),
        show: None,
    }
}

fn request(edits: &[(&str, SectionEdit)]) -> UpdateContentRequest {
    UpdateContentRequest {
        tenant_id: TENANT,
        document: DocumentName::Index,
        edits: edits
            .iter()
            .map(|(key, edit)| ((*key).to_owned(), edit.clone()))
            .collect::<BTreeMap<_, _>>(),
    }
}

#[rstest]
#[tokio::test]
async fn establish_reconciles_materializes_and_renders(record: TenantRecord) {
    let base = "<div x-binding-key=\"hero\" x-binding-type=\"title\">Welcome</div>\
                <p x-binding-key=\"intro\" x-binding-type=\"content\">Hi there</p>";

    let mut blobs = MockBlobStore::new();
    blobs
        .expect_get()
        .with(eq(location(ArtifactKind::BaseTemplate)))
        .return_once(move |_| Ok(Some(base.as_bytes().to_vec())));
    blobs
        .expect_put()
        .withf(|location, body, _| {
            *location == ArtifactKind::WorkingTemplate.locate(TENANT, DocumentName::Index)
                && String::from_utf8_lossy(body).contains("{{ hero }}")
        })
        .times(1)
        .return_once(|_, _, _| Ok(()));
    blobs
        .expect_put()
        .withf(|location, _, _| {
            *location == ArtifactKind::RenderedCopy.locate(TENANT, DocumentName::Index)
        })
        .times(1)
        .return_once(|_, _, _| Ok(()));

    let mut records = MockTenantRecordStore::new();
    let snapshot = record.clone();
    records
        .expect_fetch()
        .returning(move |_| Ok(Some(snapshot.clone())));
    records
        .expect_put_section()
        .withf(|path, section| path.key == "intro" && section.kind() == &SectionKind::Content)
        .times(1)
        .return_once(|_, _| Ok(()));
    records
        .expect_remove_section()
        .withf(|path| path.key == "stale")
        .times(1)
        .return_once(|_| Ok(()));

    let mut mapper = MockSectionMapper::new();
    mapper.expect_map_sections().return_once(|_, _| {
        Ok([(
            "hero".to_owned(),
            SectionBinding {
                kind: SectionKind::Title,
                db_map: "hero".to_owned(),
                show: true,
            },
        )]
        .into_iter()
        .collect())
    });

    let rendered = service(records, blobs, mapper)
        .establish(TENANT, DocumentName::Index)
        .await
        .expect("establishes");

    assert!(rendered.contains(">Welcome</div>"));
    assert!(!rendered.contains("{{ hero }}"));
}

#[rstest]
#[tokio::test]
async fn establish_provisions_missing_tenants() {
    let mut blobs = MockBlobStore::new();
    blobs
        .expect_get()
        .return_once(|_| Ok(Some(b"<h1>static</h1>".to_vec())));
    blobs.expect_put().times(2).returning(|_, _, _| Ok(()));

    let mut records = MockTenantRecordStore::new();
    let mut fetched = false;
    records.expect_fetch().times(2).returning(move |_| {
        let first = !fetched;
        fetched = true;
        Ok((!first).then(|| TenantRecord::provisioned(TENANT, 0)))
    });
    records
        .expect_create()
        .withf(|record| record.client_id == TENANT)
        .times(1)
        .return_once(|_| Ok(true));

    let mut mapper = MockSectionMapper::new();
    mapper
        .expect_map_sections()
        .return_once(|_, _| Ok(SectionMapping::new()));

    let rendered = service(records, blobs, mapper)
        .establish(TENANT, DocumentName::Index)
        .await
        .expect("establishes");

    assert_eq!(rendered, "<h1>static</h1>");
}

#[rstest]
#[tokio::test]
async fn establish_continues_past_failed_section_writes(record: TenantRecord) {
    let base = "<b x-binding-key=\"a\" x-binding-type=\"title\">A</b>\
                <b x-binding-key=\"b\" x-binding-type=\"title\">B</b>";
    let mut blobs = MockBlobStore::new();
    blobs
        .expect_get()
        .return_once(move |_| Ok(Some(base.as_bytes().to_vec())));
    blobs.expect_put().times(2).returning(|_, _, _| Ok(()));

    let mut records = MockTenantRecordStore::new();
    records
        .expect_fetch()
        .returning(move |_| Ok(Some(record.clone())));
    records.expect_put_section().times(2).returning(|path, _| {
        if path.key == "a" {
            Err(TenantRecordStoreError::query("throttled"))
        } else {
            Ok(())
        }
    });
    records
        .expect_remove_section()
        .times(2)
        .returning(|_| Ok(()));

    let mut mapper = MockSectionMapper::new();
    mapper
        .expect_map_sections()
        .return_once(|_, _| Ok(SectionMapping::new()));

    service(records, blobs, mapper)
        .establish(TENANT, DocumentName::Index)
        .await
        .expect("sweep failures are not fatal");
}

#[rstest]
#[tokio::test]
async fn establish_without_base_template_is_not_found() {
    let mut blobs = MockBlobStore::new();
    blobs.expect_get().return_once(|_| Ok(None));

    let error = service(
        MockTenantRecordStore::new(),
        blobs,
        MockSectionMapper::new(),
    )
    .establish(TENANT, DocumentName::Index)
    .await
    .expect_err("no base template");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn update_edits_known_keys_and_skips_unknown(record: TenantRecord) {
    let mut records = MockTenantRecordStore::new();
    records
        .expect_fetch()
        .returning(move |_| Ok(Some(record.clone())));
    records
        .expect_edit_section()
        .withf(|path, edit| path.key == "hero" && *edit == content_edit("New Title"))
        .times(1)
        .return_once(|_, _| Ok(()));

    let mut blobs = MockBlobStore::new();
    blobs
        .expect_get()
        .with(eq(location(ArtifactKind::WorkingTemplate)))
        .return_once(|_| Ok(Some(b"<h1>{{ hero }}</h1>".to_vec())));
    blobs
        .expect_put()
        .with(
            eq(location(ArtifactKind::RenderedCopy)),
            mockall::predicate::always(),
            eq(HTML_CONTENT_TYPE),
        )
        .times(1)
        .return_once(|_, _, _| Ok(()));

    let outcome = service(records, blobs, MockSectionMapper::new())
        .update(request(&[
            ("hero", content_edit("New Title")),
            ("ghost", content_edit("boo")),
        ]))
        .await
        .expect("update succeeds");

    assert_eq!(outcome.applied, vec!["hero".to_owned()]);
    assert_eq!(outcome.skipped, vec!["ghost".to_owned()]);
    outcome.render.wait().await.expect("render succeeds");
}

#[rstest]
#[tokio::test]
async fn update_rejects_when_no_key_is_known(record: TenantRecord) {
    let mut records = MockTenantRecordStore::new();
    records
        .expect_fetch()
        .return_once(move |_| Ok(Some(record)));

    let error = service(records, MockBlobStore::new(), MockSectionMapper::new())
        .update(request(&[("ghost", content_edit("boo"))]))
        .await
        .expect_err("nothing to edit");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn update_rejects_list_content_for_text_sections(record: TenantRecord) {
    let mut records = MockTenantRecordStore::new();
    records
        .expect_fetch()
        .return_once(move |_| Ok(Some(record)));
    let edit = SectionEdit {
        content: Some(SectionContent::Images(vec!["a.png".into()])),
        show: None,
    };

    let error = service(records, MockBlobStore::new(), MockSectionMapper::new())
        .update(request(&[("hero", edit)]))
        .await
        .expect_err("wrong shape");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn update_for_missing_tenant_is_not_found() {
    let mut records = MockTenantRecordStore::new();
    records.expect_fetch().return_once(|_| Ok(None));

    let error = service(records, MockBlobStore::new(), MockSectionMapper::new())
        .update(request(&[("hero", content_edit("x"))]))
        .await
        .expect_err("no tenant");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn failed_renders_do_not_fail_the_update(record: TenantRecord) {
    let mut records = MockTenantRecordStore::new();
    records
        .expect_fetch()
        .returning(move |_| Ok(Some(record.clone())));
    records.expect_edit_section().return_once(|_, _| Ok(()));
    let mut blobs = MockBlobStore::new();
    blobs
        .expect_get()
        .return_once(|_| Err(crate::domain::ports::BlobStoreError::connection("down")));

    let outcome = service(records, blobs, MockSectionMapper::new())
        .update(request(&[("hero", content_edit("New"))]))
        .await
        .expect("edit committed");

    assert_eq!(outcome.applied, vec!["hero".to_owned()]);
    let render = outcome.render.wait().await.expect_err("render failed");
    assert_eq!(render.code(), ErrorCode::UpstreamFailure);
}

#[rstest]
#[tokio::test]
async fn section_mapping_omits_hidden_sections(mut record: TenantRecord) {
    record
        .environments
        .dev
        .website
        .insert("secret".into(), title("secret", "x").with_show(false));
    let mut records = MockTenantRecordStore::new();
    records
        .expect_fetch()
        .return_once(move |_| Ok(Some(record)));

    let mapping = service(records, MockBlobStore::new(), MockSectionMapper::new())
        .section_mapping(TENANT, DocumentName::Index)
        .await
        .expect("maps");

    assert!(mapping.contains_key("hero"));
    assert!(!mapping.contains_key("secret"));
}
