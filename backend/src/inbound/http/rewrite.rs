//! AI copy rewrite handler.
//!
//! ```text
//! POST /api/v1/rewrite {"text": "...", "section": "title"}
//! ```

use actix_web::{post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::ports::RewriteRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::responses::MessageResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require_text};

/// Copy to rewrite and the section it belongs to.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RewriteBody {
    /// Copy to rewrite.
    #[schema(example = "rooms with a view of the bay")]
    pub text: Option<String>,
    /// Section the copy is meant for.
    #[schema(example = "title")]
    pub section: Option<String>,
}

/// Rewrite a piece of copy for a section.
#[utoipa::path(
    post,
    path = "/api/v1/rewrite",
    request_body = RewriteBody,
    responses(
        (status = 200, description = "Rewritten text in message", body = MessageResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Rewriter failure", body = ErrorSchema)
    ),
    tags = ["rewrite"],
    operation_id = "rewriteCopy"
)]
#[post("/rewrite")]
pub async fn rewrite_copy(
    state: web::Data<HttpState>,
    payload: web::Json<RewriteBody>,
) -> ApiResult<web::Json<MessageResponse>> {
    let RewriteBody { text, section } = payload.into_inner();
    let request = RewriteRequest {
        text: require_text(text, FieldName::new("text"))?,
        section: require_text(section, FieldName::new("section"))?,
    };
    let rewritten = state.rewriter.rewrite(request).await?;
    Ok(web::Json(MessageResponse::new(rewritten)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Error;
    use crate::inbound::http::test_utils::MockPorts;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn post(ports: MockPorts, body: Value) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(ports.into_state())
                .service(web::scope("/api/v1").service(rewrite_copy)),
        )
        .await;
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/rewrite")
            .set_json(body)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        let status = response.status();
        let bytes = actix_test::read_body(response).await;
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[rstest]
    #[actix_web::test]
    async fn rewritten_text_is_returned_in_message() {
        let mut ports = MockPorts::default();
        ports
            .rewriter
            .expect_rewrite()
            .withf(|request| request.section == "title" && request.text == "rooms")
            .returning(|_| Ok("Sunny rooms await".into()));

        let (status, body) = post(ports, json!({"text": "rooms", "section": "title"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Sunny rooms await"}));
    }

    #[rstest]
    #[actix_web::test]
    async fn blank_text_is_rejected() {
        let (status, body) = post(MockPorts::default(), json!({"text": " ", "section": "title"})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "text");
    }

    #[rstest]
    #[actix_web::test]
    async fn rewriter_failures_are_redacted() {
        let mut ports = MockPorts::default();
        ports
            .rewriter
            .expect_rewrite()
            .returning(|_| Err(Error::upstream("openai: 401 invalid api key sk-...")));

        let (status, body) = post(ports, json!({"text": "rooms", "section": "about"})).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "upstream_failure");
        assert_eq!(body["message"], "Upstream service failure");
    }
}
