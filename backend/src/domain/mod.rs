//! Domain primitives, pipeline logic and ports.
//!
//! Purpose: model tenant records and their sections, the binding pipeline
//! (extract, reconcile, materialize, substitute) and the services that
//! orchestrate it behind the driving ports. Nothing here knows about HTTP,
//! DynamoDB or S3; adapters live in `inbound` and `outbound`.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - TenantRecord, Section, SectionEdit: persisted content model.
//! - ContentService, PublishService, RewriteService, BlobPreviewService:
//!   driving port implementations.

pub mod artifact;
pub mod binding;
pub mod content_service;
pub mod error;
pub mod mapping;
pub mod markup;
pub mod ports;
pub mod preview;
pub mod publisher;
pub mod render_task;
pub mod resolver;
pub mod rewrite;
pub mod section;
pub mod template;
pub mod tenant;
pub mod trace_id;

pub use self::artifact::{ArtifactKind, BASE_TEMPLATE_BUCKET, BlobLocation};
pub use self::content_service::ContentService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::mapping::{LocalSectionMapper, SectionBinding, SectionMapping, map_sections};
pub use self::preview::BlobPreviewService;
pub use self::publisher::PublishService;
pub use self::render_task::RenderHandle;
pub use self::resolver::{DocumentResolver, Lookup, ResolveStep};
pub use self::rewrite::RewriteService;
pub use self::section::{
    CONTAINER_KIND, Section, SectionContent, SectionEdit, SectionKind, SectionValidationError,
};
pub use self::tenant::{
    Channel, DocumentName, EnvironmentName, EnvironmentRecord, Environments, SectionMap,
    TenantId, TenantIdValidationError, TenantRecord, UnknownDocumentName,
};
pub use self::trace_id::TraceId;
