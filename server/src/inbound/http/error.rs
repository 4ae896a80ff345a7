//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep [`ApiError`] HTTP-agnostic while turning failures into
//! `errors` documents encoded with the negotiated codec.

use actix_web::http::{StatusCode, header};
use actix_web::HttpResponse;
use tracing::{error, warn};

use super::negotiation::Negotiated;
use crate::domain::ApiError;

fn status_for(err: &ApiError) -> StatusCode {
    StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Render `err` as an `errors` document and log it.
///
/// Server-side failures log at error level and client mistakes at warn.
pub fn error_response(negotiated: &Negotiated, err: &ApiError) -> HttpResponse {
    let status = status_for(err);
    let trace_id = err.trace_id().unwrap_or("-");
    if status.is_server_error() {
        error!(trace_id, code = ?err.code(), status = status.as_u16(), error = %err, "request failed");
    } else {
        warn!(trace_id, code = ?err.code(), status = status.as_u16(), error = %err, "request rejected");
    }
    HttpResponse::build(status)
        .insert_header((header::CONTENT_TYPE, negotiated.content_type.as_str()))
        .body(negotiated.codec.marshal_error(err))
}

impl From<actix_web::Error> for ApiError {
    fn from(err: actix_web::Error) -> Self {
        let status = err.as_response_error().status_code();
        if status.is_server_error() {
            error!(error = %err, "actix error promoted to domain error");
            Self::internal("Internal server error")
        } else {
            Self::invalid_request(err.to_string()).with_status(status.as_u16())
        }
    }
}
