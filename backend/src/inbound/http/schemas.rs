//! Documentation-only mirrors of domain payloads.
//!
//! The domain does not depend on utoipa, so each wire shape the API returns
//! is restated here with `#[schema(as = ...)]`.

use utoipa::ToSchema;

/// Mirror of [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// Missing or malformed input.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The tenant record or document does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// A backing store or outbound service failed.
    #[schema(rename = "upstream_failure")]
    UpstreamFailure,
    /// A document could not be parsed.
    #[schema(rename = "parse_failure")]
    ParseFailure,
    /// Unexpected failure inside the service.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// Mirror of the error body returned by every endpoint.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Failure category.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Message shown to the editor; generic for store failures.
    #[schema(example = "missing required field: clientId")]
    message: String,
    /// Request trace id, also sent as the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Offending field or keys, when known.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::SectionBinding`].
///
/// Type and storage key of one visible section, keyed by selector.
#[derive(ToSchema)]
#[schema(as = crate::domain::SectionBinding, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SectionBindingSchema {
    /// Binding type, e.g. `title`, `text` or `container`.
    #[schema(rename = "type", example = "title")]
    kind: String,
    /// Storage key of the section.
    #[schema(example = "hero")]
    db_map: String,
    /// Always `true`; hidden sections are omitted.
    show: bool,
}
