//! Raw blob preview handler.
//!
//! ```text
//! GET /api/v1/preview?bucket=&file=
//! ```

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::ports::PreviewContent;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require_text};

/// Query parameters of the preview endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PreviewParams {
    /// Bucket to read from.
    pub bucket: Option<String>,
    /// Object key, or `list` for the bucket names.
    pub file: Option<String>,
}

/// Return a raw object or the bucket listing.
#[utoipa::path(
    get,
    path = "/api/v1/preview",
    params(PreviewParams),
    responses(
        (status = 200, description = "Object body, or bucket names when file=list", content_type = "text/html", body = String),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Object not found", body = ErrorSchema),
        (status = 500, description = "Upstream failure", body = ErrorSchema)
    ),
    tags = ["preview"],
    operation_id = "previewBlob"
)]
#[get("/preview")]
pub async fn preview_blob(
    state: web::Data<HttpState>,
    query: web::Query<PreviewParams>,
) -> ApiResult<HttpResponse> {
    let PreviewParams { bucket, file } = query.into_inner();
    let bucket = require_text(bucket, FieldName::new("bucket"))?;
    let file = require_text(file, FieldName::new("file"))?;

    let response = match state.preview.preview(&bucket, &file).await? {
        PreviewContent::Buckets(names) => HttpResponse::Ok().json(names),
        PreviewContent::Object(body) => HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(body),
    };
    Ok(response)
}
