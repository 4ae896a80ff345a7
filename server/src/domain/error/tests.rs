//! Tests for error construction and the rendered `errors` document.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn detailed_entry() -> ErrorObject {
    ErrorObject {
        id: "001".into(),
        href: "http://bla/blub".into(),
        status: "500".into(),
        code: "001".into(),
        title: "Title must not be empty".into(),
        detail: "Never occures in real life".into(),
        path: "#titleField".into(),
    }
}

#[rstest]
#[case(ErrorCode::InvalidRequest, 400)]
#[case(ErrorCode::Forbidden, 403)]
#[case(ErrorCode::NotFound, 404)]
#[case(ErrorCode::MissingCapability, 404)]
#[case(ErrorCode::MethodNotAllowed, 405)]
#[case(ErrorCode::ProtocolViolation, 500)]
#[case(ErrorCode::InternalError, 500)]
fn code_maps_to_default_status(#[case] code: ErrorCode, #[case] status: u16) {
    let err = ApiError::new(code, "boom");
    assert_eq!(err.status(), status);
    assert_eq!(err.explicit_status(), None);
}

#[rstest]
fn explicit_status_wins() {
    let err = ApiError::invalid_request("teapot").with_status(418);
    assert_eq!(err.status(), 418);
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(20)]
fn keeps_entries_in_insertion_order(#[case] count: usize) {
    let mut err = ApiError::invalid_request("invalid");
    for index in 0..count {
        err.push(ErrorObject {
            id: index.to_string(),
            ..ErrorObject::default()
        });
    }
    assert_eq!(err.errors().len(), count);
    let ids: Vec<_> = err.errors().iter().map(|entry| entry.id.clone()).collect();
    let expected: Vec<_> = (0..count).map(|index| index.to_string()).collect();
    assert_eq!(ids, expected);
}

#[rstest]
fn renders_every_member_of_an_entry(detailed_entry: ErrorObject) {
    let err = ApiError::invalid_request("ignored").with_error(detailed_entry);
    let rendered = serde_json::to_string(&err.to_document()).expect("serialise document");
    assert_eq!(
        rendered,
        r##"{"errors":[{"id":"001","href":"http://bla/blub","status":"500","code":"001","title":"Title must not be empty","detail":"Never occures in real life","path":"#titleField"}]}"##
    );
}

#[rstest]
fn omits_empty_members() {
    let entry = ErrorObject {
        title: "only a title".into(),
        ..ErrorObject::default()
    };
    let value = serde_json::to_value(&entry).expect("serialise entry");
    assert_eq!(value, json!({ "title": "only a title" }));
}

#[rstest]
fn falls_back_to_message_entry() {
    let err = ApiError::not_found("post 7 does not exist");
    let value = serde_json::to_value(err.to_document()).expect("serialise document");
    assert_eq!(
        value,
        json!({ "errors": [{ "status": "404", "title": "post 7 does not exist" }] })
    );
}

#[rstest]
fn pagination_errors_are_invalid_requests() {
    let err = ApiError::from(PaginationError::Zero {
        param: pagination::SIZE_PARAM,
    });
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "page[size] must be greater than zero");
}

#[rstest]
fn trace_id_absent_out_of_scope() {
    assert!(ApiError::internal("boom").trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn captures_trace_id_in_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("fixture is a valid UUID");
    let err = TraceId::scope(trace_id, async { ApiError::internal("boom") }).await;
    assert_eq!(err.trace_id(), Some(TRACE_ID));
}
