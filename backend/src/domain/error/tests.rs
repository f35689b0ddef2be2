//! Tests for the domain error payload.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::upstream("store down"), ErrorCode::UpstreamFailure)]
#[case(Error::parse_failure("bad html"), ErrorCode::ParseFailure)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn new_substitutes_blank_messages() {
    let error = Error::new(ErrorCode::InternalError, "");
    assert_eq!(error.message(), "unspecified error");
}

#[rstest]
fn new_has_no_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::upstream("boom") }).await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
fn serialises_with_snake_case_code_and_camel_case_fields(expected_trace_id: String) {
    let error = Error::invalid_request("bad")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"field": "clientId"}));

    let value = serde_json::to_value(&error).expect("error serialises");
    assert_eq!(
        value,
        json!({
            "code": "invalid_request",
            "message": "bad",
            "traceId": expected_trace_id,
            "details": {"field": "clientId"},
        })
    );
}

#[rstest]
fn deserialising_rejects_blank_messages() {
    let result: Result<Error, _> =
        serde_json::from_value(json!({"code": "not_found", "message": " "}));
    assert!(result.is_err());
}

#[rstest]
fn round_trips_through_json() {
    let error = Error::parse_failure("unterminated tag").with_details(json!({"offset": 12}));
    let encoded = serde_json::to_string(&error).expect("serialise");
    let decoded: Error = serde_json::from_str(&encoded).expect("deserialise");
    assert_eq!(decoded, error);
}

#[rstest]
fn redaction_keeps_code_and_trace_id() {
    let error = Error::upstream("s3: NoSuchBucket test-environment-bucket-3")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"bucket": "test-environment-bucket-3"}));

    let redacted = error.redacted("Upstream service failure");

    assert_eq!(redacted.code(), ErrorCode::UpstreamFailure);
    assert_eq!(redacted.message(), "Upstream service failure");
    assert_eq!(redacted.trace_id(), Some(TRACE_ID));
    assert!(redacted.details().is_none());
}

#[rstest]
#[case(ErrorCode::InvalidRequest, false)]
#[case(ErrorCode::NotFound, false)]
#[case(ErrorCode::ParseFailure, false)]
#[case(ErrorCode::UpstreamFailure, true)]
#[case(ErrorCode::InternalError, true)]
fn server_side_codes(#[case] code: ErrorCode, #[case] expected: bool) {
    assert_eq!(code.is_server_side(), expected);
}
