//! Domain-level error types.
//!
//! These errors are transport agnostic. [`ApiError`] carries a stable
//! [`ErrorCode`], a message, an optional explicit status and the ordered list
//! of JSON:API error objects. Inbound adapters resolve the status and render
//! the `errors` document.

use pagination::PaginationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::trace_id::TraceId;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// The request is well formed but may not be applied.
    Forbidden,
    /// The requested resource or relation does not exist.
    NotFound,
    /// The data source lacks the capability an operation needs.
    MissingCapability,
    /// The route exists but not for the requested method.
    MethodNotAllowed,
    /// A data source answered with a status its operation may not return.
    ProtocolViolation,
    /// An unexpected error occurred while building a response.
    InternalError,
}

impl ErrorCode {
    /// HTTP status used when the error does not carry an explicit one.
    #[must_use]
    pub const fn default_status(self) -> u16 {
        match self {
            Self::InvalidRequest => 400,
            Self::Forbidden => 403,
            Self::NotFound | Self::MissingCapability => 404,
            Self::MethodNotAllowed => 405,
            Self::ProtocolViolation | Self::InternalError => 500,
        }
    }
}

/// One entry of a JSON:API `errors` array.
///
/// Every member is optional on the wire; empty strings are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Unique identifier of this occurrence.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Link to further details about the occurrence.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub href: String,
    /// HTTP status code as a string.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    /// Application specific error code.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,
    /// Short summary of the problem.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Explanation specific to this occurrence.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
    /// Pointer to the offending part of the request document.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
}

/// Top-level document rendered for failed requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDocument {
    /// Error objects in insertion order.
    pub errors: Vec<ErrorObject>,
}

/// Error raised by the document engine, the dispatcher or a data source.
///
/// # Examples
/// ```
/// use jsonapi_server::domain::{ApiError, ErrorCode, ErrorObject};
///
/// let err = ApiError::new(ErrorCode::InvalidRequest, "bad title")
///     .with_status(422)
///     .with_error(ErrorObject { title: "Title must not be empty".into(), ..ErrorObject::default() });
/// assert_eq!(err.status(), 422);
/// assert_eq!(err.errors().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    status: Option<u16>,
    errors: Vec<ErrorObject>,
    trace_id: Option<String>,
}

impl ApiError {
    /// Create an error, capturing the trace identifier in scope.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            errors: Vec::new(),
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Status resolved from the explicit override or the error code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status.unwrap_or_else(|| self.code.default_status())
    }

    /// Status chosen by the producer of the error, if any.
    #[must_use]
    pub fn explicit_status(&self) -> Option<u16> {
        self.status
    }

    /// Error objects in insertion order.
    #[must_use]
    pub fn errors(&self) -> &[ErrorObject] {
        &self.errors
    }

    /// Trace identifier captured when the error was created.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Override the HTTP status reported to clients.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Append an error object.
    #[must_use]
    pub fn with_error(mut self, error: ErrorObject) -> Self {
        self.errors.push(error);
        self
    }

    /// Append an error object in place.
    pub fn push(&mut self, error: ErrorObject) {
        self.errors.push(error);
    }

    /// Build the `errors` document for this error.
    ///
    /// An error without explicit entries renders a single entry carrying the
    /// resolved status and the message as title.
    #[must_use]
    pub fn to_document(&self) -> ErrorDocument {
        if !self.errors.is_empty() {
            return ErrorDocument {
                errors: self.errors.clone(),
            };
        }
        ErrorDocument {
            errors: vec![ErrorObject {
                status: self.status().to_string(),
                title: self.message.clone(),
                ..ErrorObject::default()
            }],
        }
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::MissingCapability`].
    pub fn missing_capability(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MissingCapability, message)
    }

    /// Convenience constructor for [`ErrorCode::MethodNotAllowed`].
    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MethodNotAllowed, message)
    }

    /// Convenience constructor for [`ErrorCode::ProtocolViolation`].
    pub fn protocol_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProtocolViolation, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl From<PaginationError> for ApiError {
    fn from(value: PaginationError) -> Self {
        Self::invalid_request(value.to_string())
    }
}

/// Result alias used across the document engine and its adapters.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests;
