//! Tenant document HTTP handlers.
//!
//! ```text
//! POST /api/v1/retrieve
//! PUT  /api/v1/update
//! PUT  /api/v1/publish
//! POST /api/v1/mapping
//! GET  /api/v1/establish?clientId=&targetFile=
//! ```

use std::collections::BTreeMap;

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, get, post, put, web};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::UpdateContentRequest;
use crate::domain::{DocumentName, Error, SectionContent, SectionEdit, TenantId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::responses::{MappingResponse, MessageResponse, UpdateResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    ClientIdInput, FieldName, missing_field_error, parse_document, parse_tenant_id,
};

const UPDATED: &str = "Updated successfully.";
const PUBLISHED: &str = "Copied successfully";
const CONTENT_SECTIONS: FieldName = FieldName::new("contentSections");

/// Tenant and document addressed by a request body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    /// Tenant identifier, as a number or numeric string.
    #[schema(value_type = Option<u64>, example = 1)]
    pub client_id: Option<ClientIdInput>,
    /// Document file name within the tenant.
    #[schema(example = "index.html")]
    pub target_file: Option<String>,
}

impl DocumentRequest {
    fn parse(self) -> Result<(TenantId, DocumentName), Error> {
        Ok((
            parse_tenant_id(self.client_id)?,
            parse_document(self.target_file)?,
        ))
    }
}

/// Query string of the establish endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EstablishQuery {
    /// Tenant identifier.
    pub client_id: Option<String>,
    /// Document name, e.g. `index.html`.
    pub target_file: Option<String>,
}

/// Field edits keyed by binding key.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentBody {
    /// Tenant id, as a number or numeric string.
    #[schema(value_type = Option<u64>, example = 1)]
    pub client_id: Option<ClientIdInput>,
    /// Document name, e.g. `index.html`.
    #[schema(example = "index.html")]
    pub target_file: Option<String>,
    /// `{key: {content?, show?}}`; `content` is a string or a list of image
    /// sources.
    #[schema(value_type = Option<Object>)]
    pub content_sections: Option<Map<String, Value>>,
}

fn invalid_edit(key: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": CONTENT_SECTIONS.as_str(),
        "key": key,
    }))
}

fn parse_content(key: &str, value: Value) -> Result<SectionContent, Error> {
    match value {
        Value::String(text) => Ok(SectionContent::Text(text)),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(src) => Ok(src),
                _ => Err(invalid_edit(key, "image sources must be strings")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(SectionContent::Images),
        _ => Err(invalid_edit(
            key,
            "content must be a string or a list of strings",
        )),
    }
}

fn parse_section_edit(key: &str, value: Value) -> Result<SectionEdit, Error> {
    let Value::Object(fields) = value else {
        return Err(invalid_edit(key, format!("edit for {key} must be an object")));
    };
    let mut edit = SectionEdit::default();
    for (field, value) in fields {
        match (field.as_str(), value) {
            ("content", content) => edit.content = Some(parse_content(key, content)?),
            ("show", Value::Bool(show)) => edit.show = Some(show),
            ("show", _) => return Err(invalid_edit(key, "show must be a boolean")),
            (other, _) => {
                return Err(invalid_edit(key, format!("unknown edit field: {other}")));
            }
        }
    }
    Ok(edit)
}

fn parse_update_request(body: UpdateContentBody) -> Result<UpdateContentRequest, Error> {
    let tenant_id = parse_tenant_id(body.client_id)?;
    let document = parse_document(body.target_file)?;
    let sections = body
        .content_sections
        .ok_or_else(|| missing_field_error(CONTENT_SECTIONS))?;
    let edits = sections
        .into_iter()
        .map(|(key, value)| parse_section_edit(&key, value).map(|edit| (key, edit)))
        .collect::<Result<BTreeMap<_, _>, _>>()?;
    Ok(UpdateContentRequest {
        tenant_id,
        document,
        edits,
    })
}

fn html(document: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(document)
}

/// Return the tenant's rendered document.
#[utoipa::path(
    post,
    path = "/api/v1/retrieve",
    request_body = DocumentRequest,
    description = "Resolve the rendered copy, rendering it from the working template on first read.",
    responses(
        (status = 200, description = "Rendered HTML", content_type = "text/html", body = String),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "No rendered copy or working template", body = ErrorSchema),
        (status = 500, description = "Upstream failure", body = ErrorSchema)
    ),
    tags = ["documents"],
    operation_id = "retrieveDocument"
)]
#[post("/retrieve")]
pub async fn retrieve_document(
    state: web::Data<HttpState>,
    payload: web::Json<DocumentRequest>,
) -> ApiResult<HttpResponse> {
    let (tenant_id, document) = payload.into_inner().parse()?;
    let rendered = state.documents.resolve(tenant_id, document).await?;
    Ok(html(rendered))
}

/// Apply field edits and re-render the document.
#[utoipa::path(
    put,
    path = "/api/v1/update",
    request_body = UpdateContentBody,
    responses(
        (status = 200, description = "Edits committed", body = UpdateResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown tenant", body = ErrorSchema),
        (status = 500, description = "Upstream failure", body = ErrorSchema)
    ),
    tags = ["documents"],
    operation_id = "updateContent"
)]
#[put("/update")]
pub async fn update_content(
    state: web::Data<HttpState>,
    payload: web::Json<UpdateContentBody>,
) -> ApiResult<web::Json<UpdateResponse>> {
    let request = parse_update_request(payload.into_inner())?;
    let tenant_id = request.tenant_id;
    let outcome = state.content.update(request).await?;

    let rendered = if state.await_render {
        match outcome.render.wait().await {
            Ok(()) => Some(true),
            Err(err) => {
                warn!(
                    operation = "update",
                    tenant = %tenant_id,
                    error = %err,
                    "edits committed but re-render failed"
                );
                Some(false)
            }
        }
    } else {
        None
    };

    Ok(web::Json(UpdateResponse {
        message: UPDATED.to_owned(),
        skipped: outcome.skipped,
        rendered,
    }))
}

/// Promote the tenant's staging state and rendered copy to production.
#[utoipa::path(
    put,
    path = "/api/v1/publish",
    request_body = DocumentRequest,
    responses(
        (status = 200, description = "Promoted", body = MessageResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown tenant", body = ErrorSchema),
        (status = 500, description = "Upstream failure", body = ErrorSchema)
    ),
    tags = ["documents"],
    operation_id = "publishDocument"
)]
#[put("/publish")]
pub async fn publish_document(
    state: web::Data<HttpState>,
    payload: web::Json<DocumentRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let (tenant_id, document) = payload.into_inner().parse()?;
    state.publisher.publish(tenant_id, document).await?;
    Ok(web::Json(MessageResponse::new(PUBLISHED)))
}

/// Selector mapping of the tenant's visible sections.
#[utoipa::path(
    post,
    path = "/api/v1/mapping",
    request_body = DocumentRequest,
    responses(
        (status = 200, description = "Selector mapping", body = MappingResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown tenant", body = ErrorSchema),
        (status = 500, description = "Upstream failure", body = ErrorSchema)
    ),
    tags = ["documents"],
    operation_id = "sectionMapping"
)]
#[post("/mapping")]
pub async fn section_mapping(
    state: web::Data<HttpState>,
    payload: web::Json<DocumentRequest>,
) -> ApiResult<web::Json<MappingResponse>> {
    let (tenant_id, document) = payload.into_inner().parse()?;
    let message = state.documents.section_mapping(tenant_id, document).await?;
    Ok(web::Json(MappingResponse { message }))
}

/// Rebuild the tenant's working template from the base template.
#[utoipa::path(
    get,
    path = "/api/v1/establish",
    params(EstablishQuery),
    description = "Extract, reconcile and materialize the base template, then return the rendered document.",
    responses(
        (status = 200, description = "Rendered HTML", content_type = "text/html", body = String),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "No base template", body = ErrorSchema),
        (status = 500, description = "Parse or upstream failure", body = ErrorSchema)
    ),
    tags = ["documents"],
    operation_id = "establishDocument"
)]
#[get("/establish")]
pub async fn establish_document(
    state: web::Data<HttpState>,
    query: web::Query<EstablishQuery>,
) -> ApiResult<HttpResponse> {
    let EstablishQuery {
        client_id,
        target_file,
    } = query.into_inner();
    let tenant_id = parse_tenant_id(client_id.map(ClientIdInput::Text))?;
    let document = parse_document(target_file)?;
    let rendered = state.content.establish(tenant_id, document).await?;
    Ok(html(rendered))
}
