//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every document, preview, rewrite and health endpoint
//! plus the schema wrappers that describe domain types without coupling them
//! to utoipa. Swagger UI serves it in debug builds and
//! `cargo run --bin openapi-dump` exports it for tooling.

use crate::inbound::http::documents::{DocumentRequest, UpdateContentBody};
use crate::inbound::http::responses::{MappingResponse, MessageResponse, UpdateResponse};
use crate::inbound::http::rewrite::RewriteBody;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, SectionBindingSchema};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "pagebind API",
        description = "Tenant content pipeline: establish, retrieve, update and publish bound HTML documents."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::documents::retrieve_document,
        crate::inbound::http::documents::update_content,
        crate::inbound::http::documents::publish_document,
        crate::inbound::http::documents::section_mapping,
        crate::inbound::http::documents::establish_document,
        crate::inbound::http::preview::preview_blob,
        crate::inbound::http::rewrite::rewrite_copy,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        SectionBindingSchema,
        DocumentRequest,
        UpdateContentBody,
        UpdateResponse,
        MessageResponse,
        MappingResponse,
        RewriteBody
    )),
    tags(
        (name = "documents", description = "Tenant document pipeline"),
        (name = "preview", description = "Raw blob access for debugging"),
        (name = "rewrite", description = "AI copy rewriting"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn every_pipeline_endpoint_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/retrieve",
            "/api/v1/update",
            "/api/v1/publish",
            "/api/v1/mapping",
            "/api/v1/establish",
            "/api/v1/preview",
            "/api/v1/rewrite",
            "/health/ready",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
